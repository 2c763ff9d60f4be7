//! Source compilation subsystem.
//!
//! # Data Flow
//! ```text
//! Top-level .tera file
//!     → resolver.rs (read file, visited registry, import interception)
//!     → scanner.rs (line state machine, balanced route blocks)
//!     → attributes.rs (block body → attribute map)
//!     → relaxed_json.rs (lenient literal → serde_json::Value)
//!     → RouteNode tree returned to the caller
//!
//! Reload (watcher.rs):
//!     File change → fresh compilation context → new RouteTable → channel
//! ```
//!
//! # Design Decisions
//! - Compilation is synchronous and depth-first; merge order is
//!   deterministic (last writer wins)
//! - The visited registry is scoped to one compilation, never global
//! - Failed imports and blocks are logged and skipped; only the top-level
//!   read failure aborts

pub mod attributes;
pub mod relaxed_json;
pub mod resolver;
pub mod scanner;
pub mod types;
pub mod watcher;

pub use resolver::{compile, Compiler};
pub use types::{AttributeMap, AttributeValue, CompileError, RouteNode};
