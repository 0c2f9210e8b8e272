//! Request dispatch module
//!
//! Entry point for HTTP request processing. Every request lands on the same
//! route; method and content type pick one of three handling paths.

use crate::config::AppState;
use crate::handler::{greet, page, upload};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{HeaderMap, Method, Request, Response, Version};
use std::convert::Infallible;
use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Handling path chosen for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `POST` with an `application/octet-stream` body
    Upload,
    /// Any `GET`
    Page,
    /// Everything else
    Greeting,
}

impl Route {
    pub fn classify(method: &Method, headers: &HeaderMap) -> Self {
        if *method == Method::POST && http::is_octet_stream(headers) {
            Self::Upload
        } else if *method == Method::GET {
            Self::Page
        } else {
            Self::Greeting
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Page => "page",
            Self::Greeting => "greeting",
        }
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: Option<SocketAddr>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes> + Unpin,
    B::Error: Display,
{
    let started = Instant::now();
    let route = Route::classify(req.method(), req.headers());

    let access_entry = state
        .config
        .logging
        .access_log
        .then(|| access_log_entry(&req, peer_addr));

    let response = match route {
        Route::Upload => upload::handle_upload(req.into_body(), &state.uploader).await,
        Route::Page => page::serve_page(&state.page_cache).await,
        Route::Greeting => greet::handle_greeting(req).await,
    };

    if let Some(mut entry) = access_entry {
        entry.route = route.as_str();
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or_default();
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

fn access_log_entry<B>(req: &Request<B>, peer_addr: Option<SocketAddr>) -> AccessLogEntry {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.map_or_else(|| "-".to_string(), |a| a.to_string()),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_str(req.version()).to_string();
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry
}

const fn version_str(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
