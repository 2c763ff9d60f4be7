//! HTTP serving subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, dispatch handler, table lookup)
//!     → response.rs (select body plan, apply status/headers/type)
//!     → Send to client
//! ```

pub mod response;
pub mod server;

pub use server::HttpServer;
