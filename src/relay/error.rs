//! Relay error definitions and their HTTP mapping.

use std::path::PathBuf;
use std::time::Duration;

use axum::http::uri::InvalidUri;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::security::headers::{cors_headers, HeaderRuleError};
use crate::security::paths::PathError;

/// Body of every static-file failure.
pub const FILE_NOT_FOUND: &str = "File not found";

/// Errors that can occur while relaying a request.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The static file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The request path cannot be mapped under the static root.
    #[error(transparent)]
    PathRejected(#[from] PathError),

    /// The upstream base URL is unusable.
    #[error("invalid upstream URL `{url}`: {source}")]
    UpstreamUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A configured header rule failed to parse.
    #[error("Header rule error: {0}")]
    HeaderRule(#[from] HeaderRuleError),

    /// The upstream URL for a request is not a valid URI.
    #[error("invalid upstream target: {0}")]
    InvalidTarget(#[from] InvalidUri),

    /// The TLS connector could not be constructed.
    #[error("TLS error: {0}")]
    Tls(#[source] rustls::Error),

    /// Connecting to or talking with the upstream failed.
    #[error("Upstream error: {0}")]
    Upstream(#[source] hyper_util::client::legacy::Error),

    /// The upstream did not start responding in time.
    #[error("Upstream timeout after {} seconds", .0.as_secs())]
    UpstreamTimeout(Duration),
}

/// Result alias for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

impl RelayError {
    /// Status code returned to the client for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::FileRead { .. } | RelayError::PathRejected(_) => StatusCode::NOT_FOUND,
            RelayError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            RelayError::UpstreamUrl { .. }
            | RelayError::HeaderRule(_)
            | RelayError::InvalidTarget(_)
            | RelayError::Tls(_)
            | RelayError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            // File failures carry no CORS headers.
            RelayError::FileRead { .. } | RelayError::PathRejected(_) => {
                (status, FILE_NOT_FOUND).into_response()
            }
            RelayError::UpstreamTimeout(_) => {
                (status, cors_headers(), "Upstream request timed out").into_response()
            }
            _ => (status, cors_headers(), "Upstream request failed").into_response(),
        }
    }
}
