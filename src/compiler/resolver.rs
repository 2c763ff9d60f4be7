//! Import resolution and compilation entry point.
//!
//! # Responsibilities
//! - Resolve a source path to its absolute identity
//! - Guard against re-importing an already-visited file
//! - Drive the block scanner over the file's lines
//! - Intercept import directives and merge imported routes
//!
//! # Design Decisions
//! - The visited registry lives in a `Compiler` value created per top-level
//!   compilation, never in global state; independent compilations cannot
//!   skip each other's files
//! - Imports are compiled depth-first and synchronously so that the
//!   last-writer-wins merge order stays deterministic
//! - A failed import or route block is logged and skipped; only the
//!   top-level read failure is fatal

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::compiler::attributes::parse_attributes;
use crate::compiler::scanner::{BlockScanner, ScanItem, ScannedBlock};
use crate::compiler::types::{CompileError, RouteNode};

static IMPORT_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^import\s+"(.+?)"\s*$"#).expect("import pattern is valid"));

/// Extension appended to import paths that do not carry it.
pub const SOURCE_EXTENSION: &str = ".tera";

/// Compile a source file into a route tree.
///
/// This is the top-level entry point: it creates a fresh compilation
/// context, so repeated calls never share visited-file state.
pub fn compile(file: impl AsRef<Path>) -> Result<RouteNode, CompileError> {
    Compiler::new().compile_file(file.as_ref(), Path::new(""))
}

/// Compilation context for one top-level `compile` call.
///
/// Owns the visited-file registry that guards against cyclic and duplicate
/// imports. Dropped when compilation returns.
pub struct Compiler {
    visited: HashSet<PathBuf>,
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            visited: HashSet::new(),
        }
    }

    /// Compile `file`, resolved against `base`, into a route tree.
    ///
    /// Returns the cycle placeholder without re-reading when the resolved
    /// path has already been visited in this compilation.
    pub fn compile_file(&mut self, file: &Path, base: &Path) -> Result<RouteNode, CompileError> {
        let identity = resolve_identity(base, file);
        if self.visited.contains(&identity) {
            tracing::info!(path = %identity.display(), "File already imported");
            return Ok(RouteNode::cycle_placeholder());
        }
        self.visited.insert(identity.clone());

        tracing::info!(path = %identity.display(), "Compiling file");
        let text =
            std::fs::read_to_string(&identity).map_err(|source| CompileError::SourceRead {
                path: identity.clone(),
                source,
            })?;

        let importer_dir = identity.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut root = RouteNode::root();
        let mut scanner = BlockScanner::new(&text);

        while let Some(item) = scanner.next_item() {
            match item {
                ScanItem::Import { directive, line } => {
                    self.handle_import(&directive, line, &importer_dir, &mut root);
                }
                ScanItem::Block(block) => attach_block(block, &identity, &mut root),
            }
        }

        Ok(root)
    }

    /// Resolve and recursively compile one import directive, merging the
    /// imported routes into `root`.
    fn handle_import(
        &mut self,
        directive: &str,
        line: usize,
        importer_dir: &Path,
        root: &mut RouteNode,
    ) {
        let Some(caps) = IMPORT_DIRECTIVE.captures(directive) else {
            tracing::warn!(line, text = directive, "Skipped invalid import");
            return;
        };

        let mut import_path = caps[1].to_string();
        if !import_path.ends_with(SOURCE_EXTENSION) {
            import_path.push_str(SOURCE_EXTENSION);
        }

        tracing::info!(path = %import_path, "Importing file");
        match self.compile_file(Path::new(&import_path), importer_dir) {
            Ok(imported) => {
                for (_, node) in imported.children {
                    root.add_child(node);
                }
            }
            Err(err) => {
                tracing::error!(path = %import_path, error = %err, "Failed to import file");
            }
        }
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a completed block's attributes and attach the node.
///
/// A block that fails to parse still contributes its node; the attributes
/// simply stay unset.
fn attach_block(block: ScannedBlock, source: &Path, root: &mut RouteNode) {
    let mut node = RouteNode::new(block.path, block.method);
    let route_key = format!("{} {}", node.method, node.path);

    match &block.body {
        Some(body) => match parse_attributes(body) {
            Ok(attributes) => {
                node.attributes = Some(attributes);
                tracing::info!(route = %route_key, "Parsed route");
            }
            Err(err) => {
                let file = source
                    .file_name()
                    .and_then(|name| name.to_str())
                    .unwrap_or_default();
                tracing::error!(
                    route = %route_key,
                    file,
                    line = block.header_line,
                    error = %err,
                    "Failed to parse route"
                );
            }
        },
        None => {
            tracing::warn!(route = %route_key, line = block.header_line, "Unterminated route block");
        }
    }

    root.add_child(node);
}

/// Absolute, lexically normalized identity of a source file.
///
/// `..` and `.` components are collapsed without touching the filesystem so
/// that the same file reached through different relative spellings maps to
/// one registry key.
fn resolve_identity(base: &Path, file: &Path) -> PathBuf {
    let joined = if file.is_absolute() {
        file.to_path_buf()
    } else {
        base.join(file)
    };
    let absolute = std::path::absolute(&joined).unwrap_or(joined);

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::ParentDir => {
                normalized.pop();
            }
            Component::CurDir => {}
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_resolve_identity_collapses_dot_components() {
        let base = Path::new("/srv/app/routes");
        let a = resolve_identity(base, Path::new("../routes/api.tera"));
        let b = resolve_identity(base, Path::new("./api.tera"));
        assert_eq!(a, b);
        assert_eq!(a, PathBuf::from("/srv/app/routes/api.tera"));
    }

    #[test]
    fn test_missing_top_level_file_is_fatal() {
        let err = compile("/definitely/not/here.tera").unwrap_err();
        assert!(matches!(err, CompileError::SourceRead { .. }));
    }

    #[test]
    fn test_compile_single_route() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("main.tera");
        fs::write(&file, "route \"/hello\" GET: {\n  html: Hi\n}\n").unwrap();

        let root = compile(&file).unwrap();
        assert_eq!(root.children.len(), 1);
        let node = &root.children["/hello"];
        assert_eq!(node.method, "GET");
        assert_eq!(
            node.attributes.as_ref().unwrap()["html"].as_text(),
            Some("Hi")
        );
    }

    #[test]
    fn test_broken_block_keeps_node_without_attributes() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("main.tera");
        fs::write(
            &file,
            "route \"/bad\" GET: {\n  json: { url: 'http://x' }\n}\nroute \"/ok\" GET: {\n  html: fine\n}\n",
        )
        .unwrap();

        let root = compile(&file).unwrap();
        assert_eq!(root.children.len(), 2);
        assert!(root.children["/bad"].attributes.is_none());
        assert!(root.children["/ok"].attributes.is_some());
    }
}
