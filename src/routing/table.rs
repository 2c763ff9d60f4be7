//! Dispatch table built from a compiled route tree.

use std::collections::HashMap;

use crate::compiler::types::{AttributeMap, RouteNode};

/// Catch-all key consulted when no exact method+path entry matches.
pub const WILDCARD_KEY: &str = "GET /*";

/// Flattened `"<METHOD> <path>"` → attribute map lookup.
///
/// Immutable after construction; a reload builds a whole new table and swaps
/// it in atomically.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: HashMap<String, AttributeMap>,
}

impl RouteTable {
    /// Flatten the root's direct children into the dispatch map.
    ///
    /// A node whose block never parsed has nothing to dispatch and
    /// contributes no entry.
    pub fn from_tree(root: RouteNode) -> Self {
        let mut routes = HashMap::new();
        for (_, node) in root.children {
            let key = format!("{} {}", node.method.to_uppercase(), node.path);
            match node.attributes {
                Some(attributes) => {
                    routes.insert(key, attributes);
                }
                None => {
                    tracing::warn!(route = %key, "Route has no parsed attributes, not serving it");
                }
            }
        }
        Self { routes }
    }

    /// Exact method+path lookup with the `GET /*` wildcard fallback.
    pub fn lookup(&self, method: &str, path: &str) -> Option<&AttributeMap> {
        let key = format!("{} {}", method.to_uppercase(), path);
        self.routes
            .get(&key)
            .or_else(|| self.routes.get(WILDCARD_KEY))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Iterate the dispatch keys, for startup logging.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }
}
