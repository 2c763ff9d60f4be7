//! Teralang: declarative HTTP route definitions, compiled and served.

pub mod compiler;
pub mod http;
pub mod observability;
pub mod routing;

pub use compiler::resolver::{compile, Compiler};
pub use compiler::types::{AttributeMap, AttributeValue, CompileError, RouteNode};
pub use http::HttpServer;
pub use routing::RouteTable;
