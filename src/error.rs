//! Error types
//!
//! Every failure a request can hit maps to a status code, a stable error code
//! and a short public message. The underlying cause is only ever logged.

use hyper::StatusCode;

/// Failures while serving the cached page
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("page source not found: {0}")]
    NotFound(String),

    #[error("failed to read page source: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures reported by an object storage backend
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("storage backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to obtain storage credentials: {0}")]
    Auth(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures in the upload pipeline
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("request body is empty")]
    EmptyBody,

    #[error("failed to read request body: {0}")]
    BodyRead(String),

    #[error(transparent)]
    Backend(#[from] StorageError),
}

/// Failures while producing a greeting
#[derive(Debug, thiserror::Error)]
pub enum GreetingError {
    #[error("failed to read request body: {0}")]
    BodyRead(String),
}

/// Mapping from an internal error to what the client is allowed to see
pub trait PublicError: std::error::Error {
    fn status(&self) -> StatusCode;

    /// Stable machine-readable code, sent as `X-Error-Code`
    fn code(&self) -> &'static str;

    fn public_message(&self) -> &'static str;
}

impl PublicError for PageError {
    fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "page_not_found",
            Self::Io(_) => "page_unreadable",
        }
    }

    fn public_message(&self) -> &'static str {
        "Error loading page"
    }
}

impl PublicError for GreetingError {
    fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn code(&self) -> &'static str {
        "body_unreadable"
    }

    fn public_message(&self) -> &'static str {
        "Error reading request body"
    }
}

impl PublicError for UploadError {
    fn status(&self) -> StatusCode {
        match self {
            Self::EmptyBody => StatusCode::BAD_REQUEST,
            Self::BodyRead(_) | Self::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::EmptyBody => "empty_body",
            Self::BodyRead(_) => "body_unreadable",
            Self::Backend(_) => "storage_failed",
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            Self::EmptyBody => "No data received",
            Self::BodyRead(_) => "Error reading request body",
            Self::Backend(_) => "Error uploading file",
        }
    }
}
