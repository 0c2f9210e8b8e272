//! HTTP response building module
//!
//! Provides builders for the responses the dispatcher can produce, decoupled from specific business logic.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use crate::error::PublicError;

pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
pub const TEXT_HTML: &str = "text/html; charset=utf-8";

/// Header carrying the machine-readable error code on failures
pub const ERROR_CODE_HEADER: &str = "X-Error-Code";

/// Build plain-text response
pub fn build_text_response(status: StatusCode, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    let body = body.into();
    Response::builder()
        .status(status)
        .header("Content-Type", TEXT_PLAIN)
        .header("Content-Length", body.len())
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build HTML page response
pub fn build_html_response(content: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", TEXT_HTML)
        .header("Content-Length", content.len())
        .body(Full::new(Bytes::copy_from_slice(content.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build error response: generic public message plus error code header
pub fn build_error_response(error: &impl PublicError) -> Response<Full<Bytes>> {
    let message = error.public_message();
    Response::builder()
        .status(error.status())
        .header("Content-Type", TEXT_PLAIN)
        .header("Content-Length", message.len())
        .header(ERROR_CODE_HEADER, error.code())
        .body(Full::new(Bytes::from_static(message.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error(error.status().as_str(), &e);
            Response::new(Full::new(Bytes::from_static(message.as_bytes())))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
