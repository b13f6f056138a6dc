//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::Deserialize;

/// Upstream API host that receives every non-static request.
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.openai.com";

/// Header rules applied to requests on their way upstream.
pub const DEFAULT_REQUEST_HEADER_RULES: [&str; 2] = ["content-type", "authorization"];

/// Header rules applied to upstream responses on their way back.
pub const DEFAULT_RESPONSE_HEADER_RULES: [&str; 3] = ["content-type", "^x-ratelimit-", "^openai-"];

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream API target and timeouts.
    pub upstream: UpstreamConfig,

    /// Local static file serving.
    pub static_files: StaticFilesConfig,

    /// Header whitelists for both directions.
    pub headers: HeaderRulesConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Scheme and host requests are forwarded to. Any path is ignored.
    pub base_url: String,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Time allowed for the upstream to start responding, in seconds.
    /// Streaming the body afterwards is not bounded.
    pub response_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_UPSTREAM_URL.to_string(),
            connect_timeout_secs: 10,
            response_timeout_secs: 120,
        }
    }
}

/// Static file configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Directory request paths are resolved against.
    pub root: PathBuf,

    /// Path segment that routes a request to the file system.
    pub marker: String,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            marker: "static".to_string(),
        }
    }
}

/// Header whitelist rules.
///
/// A rule starting with `^` is a case-insensitive pattern, anything else is
/// an exact header name.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HeaderRulesConfig {
    /// Request headers forwarded upstream.
    pub request: Vec<String>,

    /// Upstream response headers returned to the client.
    pub response: Vec<String>,
}

impl Default for HeaderRulesConfig {
    fn default() -> Self {
        Self {
            request: DEFAULT_REQUEST_HEADER_RULES.iter().map(ToString::to_string).collect(),
            response: DEFAULT_RESPONSE_HEADER_RULES.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
