//! Path matching logic.
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Matches whole `/`-separated segments, never substrings
//! - No regex to guarantee O(n) matching

/// Matches request paths containing a given segment.
#[derive(Debug, Clone)]
pub struct SegmentMatcher {
    segment: String,
}

impl SegmentMatcher {
    /// Create a new segment matcher.
    pub fn new(segment: impl Into<String>) -> Self {
        Self {
            segment: segment.into(),
        }
    }

    /// Returns true if any segment of `path` equals the expected one.
    pub fn matches(&self, path: &str) -> bool {
        path.split('/').any(|segment| segment == self.segment)
    }
}
