//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from specific business logic.

pub mod request;
pub mod response;

// Re-export commonly used items
pub use request::{is_octet_stream, query_param};
pub use response::{build_error_response, build_html_response, build_text_response};
