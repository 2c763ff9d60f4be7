//! Teralang server binary.
//!
//! Compiles a declarative `.tera` route definition file into a route tree,
//! flattens it into a dispatch table, and serves it over HTTP:
//!
//! ```text
//! teralang serve routes.tera --port 3000
//! teralang check routes.tera
//! ```
//!
//! The source file is watched while serving; edits are recompiled and the
//! dispatch table swapped without restarting.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use teralang::compiler::resolver::compile;
use teralang::compiler::watcher::SourceWatcher;
use teralang::http::HttpServer;
use teralang::observability::logging;
use teralang::routing::RouteTable;

#[derive(Parser)]
#[command(name = "teralang")]
#[command(about = "Serve declarative .tera route definitions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a source file and serve its routes
    Serve {
        /// Top-level .tera file
        file: PathBuf,

        /// Port to listen on
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
    /// Compile a source file and print the route tree as JSON
    Check {
        /// Top-level .tera file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            // Usage problems go to stderr, exit status 1.
            let _ = err.print();
            return ExitCode::FAILURE;
        }
    };

    logging::init();

    match cli.command {
        Commands::Serve { file, port } => serve(file, port).await,
        Commands::Check { file } => check(&file),
    }
}

async fn serve(file: PathBuf, port: u16) -> ExitCode {
    let root = match compile(&file) {
        Ok(root) => root,
        Err(err) => {
            tracing::error!(error = %err, "Failed to compile source file");
            return ExitCode::FAILURE;
        }
    };

    let table = RouteTable::from_tree(root);
    tracing::info!(routes = table.len(), "Route table built");
    for key in table.keys() {
        tracing::debug!(route = key, "Serving route");
    }

    let server = HttpServer::new(table);

    // Hot reload is best-effort; the server runs without it if the watcher
    // cannot start.
    let (watcher, updates) = SourceWatcher::new(&file);
    let _watch_handle = match watcher.run() {
        Ok(handle) => {
            server.spawn_reload_task(updates);
            Some(handle)
        }
        Err(err) => {
            tracing::warn!(error = %err, "Source watcher unavailable, hot reload disabled");
            None
        }
    };

    let listener = match TcpListener::bind(("0.0.0.0", port)).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(port, error = %err, "Failed to bind listener");
            return ExitCode::FAILURE;
        }
    };

    match server.run(listener).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Server encountered an error");
            ExitCode::FAILURE
        }
    }
}

fn check(file: &Path) -> ExitCode {
    let root = match compile(file) {
        Ok(root) => root,
        Err(err) => {
            tracing::error!(error = %err, "Failed to compile source file");
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&root) {
        Ok(dump) => {
            println!("{dump}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "Failed to serialize route tree");
            ExitCode::FAILURE
        }
    }
}
