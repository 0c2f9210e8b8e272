//! Static page serving
//!
//! Serves the cached page document; cache failures become a generic 500.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::cache::PageCache;
use crate::http;
use crate::logger;

/// Serve the cached page, reloading it first if the source changed
pub async fn serve_page(cache: &PageCache) -> Response<Full<Bytes>> {
    match cache.get().await {
        Ok(content) => http::build_html_response(&content),
        Err(e) => {
            logger::log_error(&format!("Failed to serve page: {e}"));
            http::build_error_response(&e)
        }
    }
}
