//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use teralang::compile;
use teralang::http::HttpServer;
use teralang::routing::RouteTable;
use tokio::net::TcpListener;

/// Write one source file into a test tree, creating parent directories.
pub fn write_source(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

/// Compile `file` and serve it on an ephemeral local port.
#[allow(dead_code)]
pub async fn serve_compiled(file: &Path) -> SocketAddr {
    let root = compile(file).expect("test source should compile");
    let table = RouteTable::from_tree(root);
    let server = HttpServer::new(table);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        server.run(listener).await.unwrap();
    });
    addr
}
