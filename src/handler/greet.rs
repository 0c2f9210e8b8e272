//! Greeting handling

use std::fmt::Display;

use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Bytes};
use hyper::{Request, Response, StatusCode};

use crate::error::GreetingError;
use crate::greeting;
use crate::http;
use crate::logger;

/// Answer `Hello {name}!` using the query string and JSON body
pub async fn handle_greeting<B>(req: Request<B>) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Display,
{
    let (parts, body) = req.into_parts();

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            let e = GreetingError::BodyRead(e.to_string());
            logger::log_error(&format!("Greeting failed: {e}"));
            return http::build_error_response(&e);
        }
    };

    let name = greeting::resolve_name(parts.uri.query(), &body);
    http::build_text_response(StatusCode::OK, greeting::greeting(&name))
}
