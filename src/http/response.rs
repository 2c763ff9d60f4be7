//! Response construction from route attributes.
//!
//! # Responsibilities
//! - Select one body strategy per route attribute map
//! - Apply `status`, `headers`, and `type` attributes
//! - Serve file payloads, guessing a content type from the extension
//!
//! # Design Decisions
//! - Body selection is a tagged variant chosen once, not repeated
//!   presence checks
//! - `json` and `html` force their content type over an explicit `type`;
//!   the file plan prefers `type` over the extension guess
//! - A file read failure becomes a 500 with a descriptive body

use std::path::Path;

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::compiler::types::{AttributeMap, AttributeValue};

/// The recognized response-construction strategies, in precedence order.
#[derive(Debug, PartialEq)]
pub enum BodyPlan<'a> {
    Json(&'a serde_json::Value),
    File(&'a str),
    Html(&'a str),
    Raw(&'a str),
    Empty,
}

impl<'a> BodyPlan<'a> {
    /// Pick the strategy for an attribute map: `json` wins over `file`,
    /// `file` over `html`, `html` over `response`.
    pub fn select(attributes: &'a AttributeMap) -> Self {
        if let Some(value) = attributes.get("json").and_then(AttributeValue::as_json) {
            return BodyPlan::Json(value);
        }
        if let Some(path) = attributes.get("file").and_then(AttributeValue::as_text) {
            return BodyPlan::File(path);
        }
        if let Some(text) = attributes.get("html").and_then(AttributeValue::as_text) {
            return BodyPlan::Html(text);
        }
        if let Some(text) = attributes.get("response").and_then(AttributeValue::as_text) {
            return BodyPlan::Raw(text);
        }
        BodyPlan::Empty
    }
}

/// Build the HTTP response for a matched route.
pub async fn render(route_key: &str, attributes: &AttributeMap) -> Response {
    let status = resolve_status(route_key, attributes);
    let mut headers = HeaderMap::new();

    if let Some(block) = attributes.get("headers").and_then(AttributeValue::as_text) {
        apply_header_block(route_key, block, &mut headers);
    }
    if let Some(content_type) = attributes.get("type").and_then(AttributeValue::as_text) {
        set_content_type(&mut headers, content_type);
    }

    match BodyPlan::select(attributes) {
        BodyPlan::Json(value) => {
            set_content_type(&mut headers, "application/json");
            tracing::info!(route = route_key, "Responding with JSON");
            (status, headers, value.to_string()).into_response()
        }
        BodyPlan::File(raw_path) => serve_file(route_key, raw_path, status, headers).await,
        BodyPlan::Html(text) => {
            set_content_type(&mut headers, "text/html");
            tracing::info!(route = route_key, "Responding with HTML");
            (status, headers, text.to_string()).into_response()
        }
        BodyPlan::Raw(text) => {
            tracing::info!(route = route_key, "Responding with custom response");
            (status, headers, text.to_string()).into_response()
        }
        BodyPlan::Empty => {
            tracing::warn!(route = route_key, "No response specified for route");
            (status, headers).into_response()
        }
    }
}

/// Parse the `status` attribute, keeping 200 on anything unusable.
fn resolve_status(route_key: &str, attributes: &AttributeMap) -> StatusCode {
    let Some(raw) = attributes.get("status").and_then(AttributeValue::as_text) else {
        return StatusCode::OK;
    };
    match raw
        .parse::<u16>()
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
    {
        Some(code) => code,
        None => {
            tracing::warn!(route = route_key, value = raw, "Invalid status code in handler");
            StatusCode::OK
        }
    }
}

/// Apply a nested `headers` block, one `name: value` pair per line.
fn apply_header_block(route_key: &str, block: &str, headers: &mut HeaderMap) {
    for line in block.lines() {
        let trimmed = line.trim().trim_end_matches(',');
        if trimmed.is_empty() || trimmed == "{" || trimmed == "}" {
            continue;
        }
        let Some((name, value)) = trimmed.split_once(':') else {
            continue;
        };
        let name = name.trim();
        let value = strip_quotes(value.trim());
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => {
                tracing::warn!(route = route_key, header = name, "Skipped invalid header");
            }
        }
    }
}

fn set_content_type(headers: &mut HeaderMap, content_type: &str) {
    if let Ok(value) = HeaderValue::from_str(content_type) {
        headers.insert(header::CONTENT_TYPE, value);
    }
}

/// Read and return a file payload.
///
/// The configured path may carry surrounding quotes; they are stripped
/// before the filesystem is touched.
async fn serve_file(
    route_key: &str,
    raw_path: &str,
    status: StatusCode,
    mut headers: HeaderMap,
) -> Response {
    let path = strip_quotes(raw_path);

    if !headers.contains_key(header::CONTENT_TYPE) {
        let guessed = mime_type_for_extension(path).unwrap_or("text/plain");
        set_content_type(&mut headers, guessed);
    }

    tracing::info!(route = route_key, file = path, "Serving file");
    match tokio::fs::read(path).await {
        Ok(bytes) => (status, headers, bytes).into_response(),
        Err(err) => {
            tracing::error!(route = route_key, file = path, error = %err, "Failed to serve file");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error reading file: {err}"),
            )
                .into_response()
        }
    }
}

/// Strip one pair of surrounding single or double quotes.
fn strip_quotes(text: &str) -> &str {
    let text = text
        .strip_prefix('"')
        .or_else(|| text.strip_prefix('\''))
        .unwrap_or(text);
    text.strip_suffix('"')
        .or_else(|| text.strip_suffix('\''))
        .unwrap_or(text)
}

/// Content type guessed from a file extension.
///
/// Covers the types the route format is realistically used to serve.
fn mime_type_for_extension(path: &str) -> Option<&'static str> {
    let extension = Path::new(path).extension()?.to_str()?;
    let mime = match extension.to_ascii_lowercase().as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "xml" => "application/xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "pdf" => "application/pdf",
        _ => return None,
    };
    Some(mime)
}
