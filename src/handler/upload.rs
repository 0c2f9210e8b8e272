//! Binary upload handling
//!
//! Drains the request body into a scrubbed buffer and runs it through the
//! upload pipeline.

use std::fmt::Display;

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Response, StatusCode};

use crate::error::UploadError;
use crate::http;
use crate::logger;
use crate::upload::{UploadBuffer, UploadPipeline};

/// Store an octet-stream request body and report its object key
pub async fn handle_upload<B>(body: B, uploader: &UploadPipeline) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes> + Unpin,
    B::Error: Display,
{
    let mut buffer = match UploadBuffer::drain(body).await {
        Ok(buffer) => buffer,
        Err(e) => {
            logger::log_error(&format!("Failed to read upload body: {e}"));
            return http::build_error_response(&e);
        }
    };

    match uploader.upload(&mut buffer).await {
        Ok(key) => http::build_text_response(
            StatusCode::OK,
            format!("File uploaded successfully: {key}"),
        ),
        Err(e) => {
            if matches!(e, UploadError::EmptyBody) {
                logger::log_warning("Rejected upload with empty body");
            }
            http::build_error_response(&e)
        }
    }
}
