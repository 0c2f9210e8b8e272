//! Request inspection helpers
//!
//! Query-string lookup and media-type checks used by the dispatcher.

use hyper::header::CONTENT_TYPE;
use hyper::HeaderMap;

use crate::storage::OCTET_STREAM;

/// First value of `name` in a raw query string, percent-decoded
pub fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Content-Type header value, if present and valid ASCII
fn content_type(headers: &HeaderMap) -> Option<&str> {
    headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
}

/// Whether the Content-Type header mentions `application/octet-stream`.
///
/// Matched as a case-insensitive substring, so parameters and odd
/// formatting around the media type do not matter.
pub fn is_octet_stream(headers: &HeaderMap) -> bool {
    content_type(headers).is_some_and(|ct| ct.to_ascii_lowercase().contains(OCTET_STREAM))
}
