//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Compiled RouteNode tree
//!     → table.rs (flatten direct children into "<METHOD> <path>" keys)
//!     → lookup: exact key, then the "GET /*" wildcard, then no match
//! ```
//!
//! # Design Decisions
//! - Table built once per compilation, immutable at runtime
//! - Exact string lookup only; no path parameters, no pattern matching
//! - Deterministic: same input always matches same route

pub mod table;

pub use table::{RouteTable, WILDCARD_KEY};
