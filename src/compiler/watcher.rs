//! Source file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::compiler::resolver::compile;
use crate::routing::table::RouteTable;

/// A watcher that monitors the top-level source file for changes.
///
/// Each change triggers a full recompilation with a fresh compilation
/// context, so files seen by an earlier compile are never skipped on reload.
pub struct SourceWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<RouteTable>,
}

impl SourceWatcher {
    /// Create a new SourceWatcher.
    ///
    /// Returns the watcher and a receiver for rebuilt route tables.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<RouteTable>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file in a background thread.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!("Source file change detected, recompiling...");
                        match compile(&path) {
                            Ok(root) => {
                                let _ = tx.send(RouteTable::from_tree(root));
                            }
                            Err(e) => {
                                tracing::error!(
                                    "Failed to recompile: {}. Keeping current routes.",
                                    e
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Source watcher started");
        Ok(watcher)
    }
}
