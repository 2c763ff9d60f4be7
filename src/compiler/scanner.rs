//! Route block scanning.
//!
//! # Data Flow
//! ```text
//! Source lines
//!     → BlockScanner::next_item() (state machine)
//!     → ScanItem::Import (resolver intercepts the directive)
//!     → ScanItem::Block (balanced block, outer braces removed)
//!     → attribute parser
//! ```
//!
//! # Design Decisions
//! - Explicit state object: position, mode, brace depth, buffer
//! - Brace tracking is purely lexical; braces inside quoted strings still
//!   move the counter
//! - Line comments are stripped from the first unquoted `//` while a block
//!   is being collected

use once_cell::sync::Lazy;
use regex::Regex;

static ROUTE_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^route\s+"(.+?)"\s+(\w+):\s*\{"#).expect("route header pattern is valid")
});

/// Scanner state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanMode {
    ScanningLines,
    CollectingBlock,
}

/// A captured route block.
#[derive(Debug, Clone)]
pub struct ScannedBlock {
    /// URL path pattern from the header.
    pub path: String,
    /// HTTP method from the header, uppercased.
    pub method: String,
    /// 1-based line number of the header.
    pub header_line: usize,
    /// Block body with the outermost brace pair removed, or `None` when the
    /// input ended before the braces balanced.
    pub body: Option<String>,
}

/// One unit of work produced by the scanner.
#[derive(Debug, Clone)]
pub enum ScanItem {
    /// A line starting with the import keyword, for the resolver to handle.
    Import {
        /// The trimmed directive line.
        directive: String,
        /// 1-based line number.
        line: usize,
    },
    /// A completed (or truncated) route block.
    Block(ScannedBlock),
}

/// Line-oriented scanner that extracts route blocks from one file's text.
pub struct BlockScanner<'a> {
    lines: Vec<&'a str>,
    position: usize,
    mode: ScanMode,
    brace_depth: i32,
    buffer: String,
    pending: Option<(String, String, usize)>,
}

impl<'a> BlockScanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines().collect(),
            position: 0,
            mode: ScanMode::ScanningLines,
            brace_depth: 0,
            buffer: String::new(),
            pending: None,
        }
    }

    /// Produce the next import directive or route block, or `None` at end
    /// of input.
    pub fn next_item(&mut self) -> Option<ScanItem> {
        while self.position < self.lines.len() {
            let line = self.lines[self.position];
            self.position += 1;
            let number = self.position;
            let trimmed = line.trim();

            match self.mode {
                ScanMode::CollectingBlock => {
                    let stripped = strip_line_comment(line);
                    self.brace_depth += stripped.matches('{').count() as i32;
                    self.brace_depth -= stripped.matches('}').count() as i32;
                    self.buffer.push_str(stripped);
                    self.buffer.push('\n');

                    if self.brace_depth == 0 {
                        return Some(self.finish_block());
                    }
                }
                ScanMode::ScanningLines => {
                    if trimmed.is_empty() || trimmed.starts_with("//") {
                        continue;
                    }
                    if trimmed.starts_with("import") {
                        return Some(ScanItem::Import {
                            directive: trimmed.to_string(),
                            line: number,
                        });
                    }
                    if trimmed.starts_with("route") {
                        match ROUTE_HEADER.captures(trimmed) {
                            Some(caps) => {
                                self.pending =
                                    Some((caps[1].to_string(), caps[2].to_uppercase(), number));
                                self.mode = ScanMode::CollectingBlock;
                                self.brace_depth = 1;
                                self.buffer.clear();
                            }
                            None => {
                                tracing::warn!(
                                    line = number,
                                    text = trimmed,
                                    "Skipped invalid route definition"
                                );
                            }
                        }
                        continue;
                    }
                    tracing::warn!(line = number, text = trimmed, "Skipped unrecognized line");
                }
            }
        }

        // Input ended while a block was still open: surface the header so
        // the caller can attach a node with unparsed attributes.
        if self.mode == ScanMode::CollectingBlock {
            self.mode = ScanMode::ScanningLines;
            self.buffer.clear();
            let (path, method, header_line) = self.pending.take()?;
            return Some(ScanItem::Block(ScannedBlock {
                path,
                method,
                header_line,
                body: None,
            }));
        }

        None
    }

    fn finish_block(&mut self) -> ScanItem {
        self.mode = ScanMode::ScanningLines;
        let (path, method, header_line) = self
            .pending
            .take()
            .expect("collecting mode always has a pending header");

        let trimmed = self.buffer.trim();
        let body = trimmed.strip_prefix('{').unwrap_or(trimmed);
        let body = body.strip_suffix('}').unwrap_or(body).to_string();
        self.buffer.clear();

        ScanItem::Block(ScannedBlock {
            path,
            method,
            header_line,
            body: Some(body),
        })
    }
}

/// Cut a line at the first `//` that is not inside a quoted string.
fn strip_line_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut prev_slash = false;

    for (index, c) in line.char_indices() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
                prev_slash = false;
            }
            None => match c {
                '"' | '\'' => {
                    quote = Some(c);
                    prev_slash = false;
                }
                '/' => {
                    if prev_slash {
                        return &line[..index - 1];
                    }
                    prev_slash = true;
                }
                _ => prev_slash = false,
            },
        }
    }

    line
}
