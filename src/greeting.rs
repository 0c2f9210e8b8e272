//! Name resolution for the greeting path
//!
//! Precedence, lowest to highest: the default `world`, the `name` query
//! parameter, then a string `name` field in a JSON request body.

use serde_json::Value;

use crate::http::query_param;

pub const DEFAULT_NAME: &str = "world";

/// Resolve the display name from a raw query string and request body
pub fn resolve_name(query: Option<&str>, body: &[u8]) -> String {
    let mut name = query_param(query, "name").unwrap_or_else(|| DEFAULT_NAME.to_string());

    if !body.is_empty() {
        if let Some(from_body) = name_from_json(body) {
            name = from_body;
        }
    }
    name
}

/// Extract a string `name` field from a JSON body.
///
/// Malformed JSON is logged and treated as "no name given"; non-string
/// `name` values are ignored.
pub fn name_from_json(body: &[u8]) -> Option<String> {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => value.get("name").and_then(Value::as_str).map(ToString::to_string),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring malformed JSON body in greeting request");
            None
        }
    }
}

pub fn greeting(name: &str) -> String {
    format!("Hello {name}!")
}
