//! Route data parsing.
//!
//! Takes the body of one captured route block (outer braces already removed
//! by the scanner) and produces the attribute map. Nested `{ ... }` values
//! are captured with their own depth counter, independent of the block
//! scanner's. The reserved `json` key is the only one whose value is decoded
//! rather than kept as text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::compiler::relaxed_json::coerce;
use crate::compiler::types::{AttributeError, AttributeMap, AttributeValue};

static ATTRIBUTE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\w+):\s*(.*)$").expect("attribute pattern is valid"));

/// Parse a block body into its attribute map.
///
/// Fails only when a `json` value does not survive coercion; the error names
/// the offending key. Blank lines, comment lines, and lines that do not look
/// like `identifier: rest` are skipped.
pub fn parse_attributes(body: &str) -> Result<AttributeMap, AttributeError> {
    let mut attributes = AttributeMap::new();

    let mut nested_key: Option<String> = None;
    let mut nested_buffer = String::new();
    let mut nested_depth: i32 = 0;

    for line in body.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }

        if nested_key.is_some() {
            nested_depth += trimmed.matches('{').count() as i32;
            nested_depth -= trimmed.matches('}').count() as i32;
            nested_buffer.push_str(trimmed);
            nested_buffer.push('\n');

            if nested_depth == 0 {
                if let Some(key) = nested_key.take() {
                    let value = finish_value(&key, nested_buffer.trim())?;
                    attributes.insert(key, value);
                }
                nested_buffer.clear();
            }
            continue;
        }

        let Some(caps) = ATTRIBUTE_LINE.captures(trimmed) else {
            continue;
        };
        let key = &caps[1];
        let rest = &caps[2];

        if rest == "{" {
            nested_key = Some(key.to_string());
            nested_buffer = String::from("{\n");
            nested_depth = 1;
        } else {
            let value = finish_value(key, rest.trim())?;
            attributes.insert(key.to_string(), value);
        }
    }

    Ok(attributes)
}

/// Produce the stored value for a completed inline or nested text.
fn finish_value(key: &str, text: &str) -> Result<AttributeValue, AttributeError> {
    if key == "json" {
        let decoded = coerce(text).map_err(|source| AttributeError {
            key: key.to_string(),
            source,
        })?;
        Ok(AttributeValue::Json(decoded))
    } else {
        Ok(AttributeValue::Text(text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inline_attributes() {
        let attrs = parse_attributes("html: \"Hi\"\nstatus: 201\n").unwrap();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs["html"].as_text(), Some("\"Hi\""));
        assert_eq!(attrs["status"].as_text(), Some("201"));
    }

    #[test]
    fn test_exactly_the_declared_keys() {
        let body = "\
status: 200
// a comment line

type: text/plain
response: done
";
        let attrs = parse_attributes(body).unwrap();
        let mut keys: Vec<_> = attrs.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, ["response", "status", "type"]);
    }

    #[test]
    fn test_inline_json_is_decoded() {
        let attrs = parse_attributes("json: { ok: true }").unwrap();
        assert_eq!(attrs["json"].as_json(), Some(&json!({"ok": true})));
    }

    #[test]
    fn test_nested_json_block() {
        let body = "\
json: {
  ok: true,
  count: 2
}
";
        let attrs = parse_attributes(body).unwrap();
        assert_eq!(
            attrs["json"].as_json(),
            Some(&json!({"ok": true, "count": 2}))
        );
    }

    #[test]
    fn test_nested_text_block_keeps_raw_lines() {
        let body = "\
headers: {
  X-Served-By: teralang
}
";
        let attrs = parse_attributes(body).unwrap();
        let text = attrs["headers"].as_text().unwrap();
        assert!(text.starts_with('{'));
        assert!(text.contains("X-Served-By: teralang"));
        assert!(text.ends_with('}'));
    }

    #[test]
    fn test_bad_json_names_the_key() {
        let err = parse_attributes("json: { url: 'http://x' }").unwrap_err();
        assert_eq!(err.key, "json");
        assert!(err.to_string().starts_with("invalid json block"));
    }

    #[test]
    fn test_stray_lines_are_ignored() {
        let attrs = parse_attributes("not an attribute\nhtml: ok\n").unwrap();
        assert_eq!(attrs.len(), 1);
        assert!(attrs.contains_key("html"));
    }
}
