//! Request handler module
//!
//! Responsible for request dispatch and for turning each handling path's
//! result into an HTTP response.

pub mod greet;
pub mod page;
pub mod router;
pub mod upload;

// Re-export main entry point
pub use router::{handle_request, Route};
