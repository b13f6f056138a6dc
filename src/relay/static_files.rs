//! Static file serving.
//!
//! Files are read whole and returned as HTML with a one day cache lifetime.
//! Any failure, including a path that escapes the root, becomes a 404.

use std::path::{Path, PathBuf};

use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};

use crate::relay::error::{RelayError, RelayResult};
use crate::security::paths::resolve_under_root;

/// Content type of every served file.
pub const STATIC_CONTENT_TYPE: &str = "text/html";

/// Cache policy of every served file.
pub const STATIC_CACHE_CONTROL: &str = "public, max-age=86400";

/// Reads files below a fixed root directory.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read the file a request path points at.
    pub async fn read(&self, pathname: &str) -> RelayResult<Vec<u8>> {
        let path = resolve_under_root(&self.root, pathname)?;
        tokio::fs::read(&path)
            .await
            .map_err(|source| RelayError::FileRead { path, source })
    }
}

/// Wrap file contents in the static response.
pub fn file_response(contents: Vec<u8>) -> Response {
    (
        [(CONTENT_TYPE, STATIC_CONTENT_TYPE), (CACHE_CONTROL, STATIC_CACHE_CONTROL)],
        contents,
    )
        .into_response()
}
