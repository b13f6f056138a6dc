//! Header whitelisting and cross-origin headers.
//!
//! # Responsibilities
//! - Parse whitelist rules (exact header names or patterns)
//! - Filter a header map down to whitelisted keys
//! - Provide the fixed CORS header set
//!
//! # Design Decisions
//! - Only the first value of a multi-valued header survives filtering
//! - Filtering keeps the encounter order of the source map
//! - Patterns are always case-insensitive; header names are lowercase anyway

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// Headers attached to preflight and proxied responses.
pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("access-control-allow-origin", "*"),
    ("access-control-allow-methods", "GET, POST, PUT, DELETE, OPTIONS"),
    ("access-control-allow-headers", "Content-Type, Authorization"),
];

/// Build a fresh header map holding exactly the CORS headers.
pub fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(CORS_HEADERS.len());
    for (name, value) in CORS_HEADERS {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    headers
}

/// Errors produced while parsing a whitelist rule.
#[derive(Debug, Error)]
pub enum HeaderRuleError {
    #[error("`{0}` is not a valid header name")]
    InvalidName(String),

    #[error("`{rule}` is not a valid header pattern: {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },
}

/// A single whitelist entry.
#[derive(Debug, Clone)]
pub enum HeaderRule {
    /// Matches one header name exactly.
    Exact(HeaderName),
    /// Matches every header name the pattern finds.
    Pattern(Regex),
}

impl HeaderRule {
    /// Parse a rule. Rules beginning with `^` are patterns.
    pub fn parse(rule: &str) -> Result<Self, HeaderRuleError> {
        if rule.starts_with('^') {
            let pattern = RegexBuilder::new(rule)
                .case_insensitive(true)
                .build()
                .map_err(|source| HeaderRuleError::InvalidPattern {
                    rule: rule.to_string(),
                    source,
                })?;
            return Ok(Self::Pattern(pattern));
        }

        HeaderName::from_bytes(rule.as_bytes())
            .map(Self::Exact)
            .map_err(|_| HeaderRuleError::InvalidName(rule.to_string()))
    }

    pub fn matches(&self, name: &HeaderName) -> bool {
        match self {
            HeaderRule::Exact(expected) => expected == name,
            HeaderRule::Pattern(pattern) => pattern.is_match(name.as_str()),
        }
    }
}

/// Ordered set of rules deciding which headers cross the relay.
#[derive(Debug, Clone, Default)]
pub struct HeaderWhitelist {
    rules: Vec<HeaderRule>,
}

impl HeaderWhitelist {
    pub fn new(rules: Vec<HeaderRule>) -> Self {
        Self { rules }
    }

    /// Parse every rule, failing on the first invalid one.
    pub fn parse<I, S>(rules: I) -> Result<Self, HeaderRuleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = rules
            .into_iter()
            .map(|rule| HeaderRule::parse(rule.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules))
    }

    /// Returns true if any rule matches `name`.
    pub fn allows(&self, name: &HeaderName) -> bool {
        self.rules.iter().any(|rule| rule.matches(name))
    }

    /// Copy the whitelisted keys of `headers`, first value only.
    pub fn filter(&self, headers: &HeaderMap) -> HeaderMap {
        let mut picked = HeaderMap::new();
        for name in headers.keys() {
            if !self.allows(name) {
                continue;
            }
            if let Some(value) = headers.get(name) {
                picked.insert(name.clone(), value.clone());
            }
        }
        picked
    }
}
