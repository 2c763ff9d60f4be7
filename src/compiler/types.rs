//! Route tree types and compiler error definitions.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Marker used for the synthetic root node's path and method.
pub const ROOT_MARKER: &str = "root";

/// Marker used for the empty node returned when an import cycle is cut.
pub const CYCLE_MARKER: &str = "import-cycle-placeholder";

/// A parsed attribute value.
///
/// Everything is kept as trimmed text except the reserved `json` key, whose
/// value is decoded into a structured [`serde_json::Value`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Trimmed inline text or the raw text of a nested block.
    Text(String),
    /// Decoded value of a `json` attribute.
    Json(serde_json::Value),
}

impl AttributeValue {
    /// The textual form of this value, if it is one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            AttributeValue::Json(_) => None,
        }
    }

    /// The structured form of this value, if it is one.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            AttributeValue::Text(_) => None,
            AttributeValue::Json(v) => Some(v),
        }
    }
}

/// Attribute map of one route block, keyed by attribute name.
pub type AttributeMap = HashMap<String, AttributeValue>;

/// One node of the compiled route tree.
///
/// The root and the cycle placeholder are synthetic nodes whose `path` and
/// `method` carry a marker instead of route data. Real route nodes hold the
/// URL path pattern, the uppercased HTTP method, and, once their block has
/// parsed successfully, the attribute map.
#[derive(Debug, Clone, Serialize)]
pub struct RouteNode {
    pub path: String,
    pub method: String,
    pub children: HashMap<String, RouteNode>,
    pub attributes: Option<AttributeMap>,
}

impl RouteNode {
    /// Create the synthetic root of a compilation.
    pub fn root() -> Self {
        Self::new(ROOT_MARKER, ROOT_MARKER)
    }

    /// Create the empty node returned for an already-visited file.
    pub fn cycle_placeholder() -> Self {
        Self::new(CYCLE_MARKER, CYCLE_MARKER)
    }

    /// Create a route node with no children and unparsed attributes.
    pub fn new(path: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: method.into(),
            children: HashMap::new(),
            attributes: None,
        }
    }

    /// Attach a child, replacing any existing child at the same path.
    pub fn add_child(&mut self, node: RouteNode) {
        self.children.insert(node.path.clone(), node);
    }

    /// Whether this node is one of the synthetic markers.
    pub fn is_synthetic(&self) -> bool {
        self.path == ROOT_MARKER || self.path == CYCLE_MARKER
    }
}

/// Errors raised while compiling a source file.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The source file could not be read. Fatal for the top-level file,
    /// recoverable for an imported one.
    #[error("failed to read {}: {source}", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An attribute block failed to parse, naming the offending key.
#[derive(Debug, Error)]
#[error("invalid {key} block: {source}")]
pub struct AttributeError {
    pub key: String,
    #[source]
    pub source: CoercionError,
}

/// Strict decoding of a rewritten lenient-JSON literal failed.
#[derive(Debug, Error)]
#[error("lenient JSON coercion failed: {0}")]
pub struct CoercionError(#[from] pub serde_json::Error);
