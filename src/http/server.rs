//! HTTP server setup and dispatch.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all dispatch handler
//! - Wire up middleware (tracing, request timeout)
//! - Look up routes in the flattened table and build responses
//! - Apply route tables rebuilt by the source watcher
//!
//! # Design Decisions
//! - Dispatch is an exact `"<METHOD> <path>"` lookup plus the `GET /*`
//!   wildcard; no pattern matching
//! - The table lives behind an `ArcSwap`, so a reload swaps it without
//!   touching in-flight requests

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::http::response::render;
use crate::routing::table::RouteTable;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state injected into the dispatch handler.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<ArcSwap<RouteTable>>,
}

/// HTTP server for compiled route tables.
pub struct HttpServer {
    router: Router,
    table: Arc<ArcSwap<RouteTable>>,
}

impl HttpServer {
    /// Create a new HTTP server serving the given table.
    pub fn new(table: RouteTable) -> Self {
        let table = Arc::new(ArcSwap::from_pointee(table));
        let state = AppState {
            table: table.clone(),
        };
        let router = Self::build_router(state);
        Self { router, table }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
            .layer(TraceLayer::new_for_http())
    }

    /// Apply route tables produced by the source watcher.
    pub fn spawn_reload_task(&self, mut updates: mpsc::UnboundedReceiver<RouteTable>) {
        let table = self.table.clone();
        tokio::spawn(async move {
            while let Some(rebuilt) = updates.recv().await {
                tracing::info!(routes = rebuilt.len(), "Applying reloaded route table");
                table.store(Arc::new(rebuilt));
            }
        });
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Tera server running");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main dispatch handler: exact lookup, wildcard fallback, 404 otherwise.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = uuid::Uuid::new_v4();
    let method = request.method().as_str().to_uppercase();
    let path = request.uri().path().to_string();
    let route_key = format!("{method} {path}");

    tracing::debug!(
        request_id = %request_id,
        route = %route_key,
        "Dispatching request"
    );

    let table = state.table.load_full();
    match table.lookup(&method, &path) {
        Some(attributes) => render(&route_key, attributes).await,
        None => {
            tracing::warn!(request_id = %request_id, route = %route_key, "Route not found");
            (StatusCode::NOT_FOUND, "Not found").into_response()
        }
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("Shutdown signal received");
}
