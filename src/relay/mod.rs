//! Request relay subsystem.
//!
//! # Data Flow
//! ```text
//! Request
//!     → routing (Preflight | StaticFile | Upstream)
//!     → Preflight:  http::response::preflight_response
//!     → StaticFile: static_files.rs (read under root) → 200 or 404
//!     → Upstream:   upstream.rs (rewrite URI, filter headers, stream body)
//!                   → http::response::proxied_response
//! ```
//!
//! # Design Decisions
//! - `handle` never fails; every error becomes a response
//! - The relay is immutable and shared through `Arc`
//! - No retries, no caching

pub mod error;
pub mod static_files;
pub mod upstream;

use std::time::Instant;

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};

use crate::config::RelayConfig;
use crate::http::response::{preflight_response, proxied_response};
use crate::observability::metrics;
use crate::routing::{Route, Router as ProxyRouter};
use crate::security::headers::HeaderWhitelist;

pub use error::{RelayError, RelayResult};
pub use static_files::StaticFiles;
pub use upstream::UpstreamClient;

/// Turns one inbound request into one response.
#[derive(Debug, Clone)]
pub struct RequestRelay {
    router: ProxyRouter,
    static_files: StaticFiles,
    upstream: UpstreamClient,
    request_headers: HeaderWhitelist,
    response_headers: HeaderWhitelist,
}

impl RequestRelay {
    /// Build a relay from validated configuration.
    pub fn from_config(config: &RelayConfig) -> RelayResult<Self> {
        let relay = Self {
            router: ProxyRouter::new(config.static_files.marker.clone()),
            static_files: StaticFiles::new(config.static_files.root.clone()),
            upstream: UpstreamClient::new(&config.upstream)?,
            request_headers: HeaderWhitelist::parse(&config.headers.request)?,
            response_headers: HeaderWhitelist::parse(&config.headers.response)?,
        };

        tracing::info!(
            upstream = %relay.upstream.base_url(),
            static_root = %relay.static_files.root().display(),
            static_marker = %config.static_files.marker,
            "Relay initialized"
        );

        Ok(relay)
    }

    /// Handle a request. Failures are turned into error responses.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        let start_time = Instant::now();
        let method = request.method().clone();
        let route = self.router.route(&method, request.uri().path());

        let response = match route {
            Route::Preflight => preflight_response(),
            Route::StaticFile => self.serve_static(request.uri().path()).await,
            Route::Upstream => self.proxy(request).await,
        };

        metrics::record_request(method.as_str(), route.as_str(), response.status().as_u16(), start_time);
        response
    }

    async fn serve_static(&self, path: &str) -> Response {
        match self.static_files.read(path).await {
            Ok(contents) => {
                tracing::debug!(path = %path, bytes = contents.len(), "Serving static file");
                static_files::file_response(contents)
            }
            Err(e) => {
                tracing::debug!(path = %path, error = %e, "Static file unavailable");
                e.into_response()
            }
        }
    }

    async fn proxy(&self, request: Request<Body>) -> Response {
        let path = request.uri().path().to_string();
        match self.upstream.forward(request, &self.request_headers).await {
            Ok(upstream) => {
                tracing::debug!(path = %path, status = %upstream.status(), "Upstream responded");
                proxied_response(upstream, &self.response_headers)
            }
            Err(e) => {
                tracing::error!(path = %path, error = %e, "Upstream request failed");
                e.into_response()
            }
        }
    }
}
