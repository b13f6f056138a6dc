//! Route selection.
//!
//! # Responsibilities
//! - Decide which of the three outcomes a request gets
//! - Stay independent of the request body and headers
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Preflight wins over every path rule
//! - Explicit Upstream rather than a silent default

use axum::http::Method;

use crate::routing::matcher::SegmentMatcher;

/// Outcome chosen for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// CORS preflight answered locally.
    Preflight,
    /// Served from the static root.
    StaticFile,
    /// Forwarded to the upstream API.
    Upstream,
}

impl Route {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Preflight => "preflight",
            Route::StaticFile => "static",
            Route::Upstream => "upstream",
        }
    }
}

/// Three-way request router.
#[derive(Debug, Clone)]
pub struct Router {
    static_files: SegmentMatcher,
}

impl Router {
    /// Create a router sending paths that contain `static_marker` as a
    /// segment to the file system.
    pub fn new(static_marker: impl Into<String>) -> Self {
        Self {
            static_files: SegmentMatcher::new(static_marker),
        }
    }

    pub fn route(&self, method: &Method, path: &str) -> Route {
        if method == Method::OPTIONS {
            Route::Preflight
        } else if self.static_files.matches(path) {
            Route::StaticFile
        } else {
            Route::Upstream
        }
    }
}
