//! Response construction.
//!
//! # Responsibilities
//! - Answer CORS preflight requests
//! - Translate upstream responses for the client
//!
//! # Design Decisions
//! - Upstream status is propagated, including errors
//! - Upstream bodies are streamed without buffering
//! - Only whitelisted upstream headers survive; CORS headers are always added

use axum::body::{Body, Bytes, HttpBody};
use axum::response::{IntoResponse, Response};
use axum::BoxError;

use crate::security::headers::{cors_headers, HeaderWhitelist};

/// Empty 200 response carrying exactly the CORS headers.
pub fn preflight_response() -> Response {
    (cors_headers(), ()).into_response()
}

/// Client-facing response for an upstream response.
pub fn proxied_response<B>(upstream: axum::http::Response<B>, whitelist: &HeaderWhitelist) -> Response
where
    B: HttpBody<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    let (parts, body) = upstream.into_parts();
    let mut headers = cors_headers();
    headers.extend(whitelist.filter(&parts.headers));

    let mut response = Response::new(Body::new(body));
    *response.status_mut() = parts.status;
    *response.headers_mut() = headers;
    response
}
