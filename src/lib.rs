//! Single-endpoint HTTP service
//!
//! One route, three behaviors: a greeting for plain requests, binary uploads
//! to object storage for `application/octet-stream` POSTs, and a cached static
//! page for GETs.

pub mod cache;
pub mod config;
pub mod error;
pub mod greeting;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
pub mod storage;
pub mod upload;
