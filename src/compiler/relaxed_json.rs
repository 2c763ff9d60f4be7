//! Lenient JSON coercion.
//!
//! Route blocks may embed relaxed object literals: unquoted identifier keys,
//! single-quoted strings, trailing commas. The coercion rewrites such a
//! literal into strict JSON text and decodes it.
//!
//! The rewrite is textual, not token-aware. A string value whose content
//! contains a colon, a quote character, or a comma can be corrupted by the
//! rewrite and fail to decode. That limitation is part of the format's
//! contract and is not patched here.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::compiler::types::CoercionError;

static BARE_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+):").expect("bare key pattern is valid"));

static TRAILING_COMMA_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*\}").expect("object comma pattern is valid"));

static TRAILING_COMMA_ARRAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*\]").expect("array comma pattern is valid"));

/// Rewrite a relaxed literal into strict JSON and decode it.
///
/// Input not already starting with `{` is wrapped into an object literal
/// first, so a bare `ok: true` decodes as `{"ok": true}`.
pub fn coerce(text: &str) -> Result<serde_json::Value, CoercionError> {
    let trimmed = text.trim();
    let full = if trimmed.starts_with('{') {
        trimmed.to_string()
    } else {
        format!("{{{trimmed}}}")
    };

    let quoted_keys = BARE_KEY.replace_all(&full, "\"${1}\":");
    let double_quoted = quoted_keys.replace('\'', "\"");
    let strict = TRAILING_COMMA_OBJECT.replace_all(&double_quoted, "}");
    let strict = TRAILING_COMMA_ARRAY.replace_all(&strict, "]");

    Ok(serde_json::from_str(&strict)?)
}
