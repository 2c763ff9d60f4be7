//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging via `tracing`, one event per compile/dispatch step
//! - File paths, line numbers, route keys, and request IDs carried as
//!   structured fields
//! - Log level configurable through the environment filter

pub mod logging;
