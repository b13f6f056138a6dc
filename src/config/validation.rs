//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, URLs and value ranges
//! - Check that every header rule compiles
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::RelayConfig;
use crate::security::headers::HeaderRule;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("`{}` is not a socket address", config.listener.bind_address),
        ));
    }

    if let Err(message) = check_upstream_url(&config.upstream.base_url) {
        errors.push(ValidationError::new("upstream.base_url", message));
    }
    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::new("upstream.connect_timeout_secs", "must be greater than 0"));
    }
    if config.upstream.response_timeout_secs == 0 {
        errors.push(ValidationError::new("upstream.response_timeout_secs", "must be greater than 0"));
    }

    let marker = &config.static_files.marker;
    if marker.is_empty() || marker.contains('/') {
        errors.push(ValidationError::new(
            "static_files.marker",
            "must be a single non-empty path segment",
        ));
    }

    for (direction, rules) in [
        ("headers.request", &config.headers.request),
        ("headers.response", &config.headers.response),
    ] {
        for (i, rule) in rules.iter().enumerate() {
            if let Err(e) = HeaderRule::parse(rule) {
                errors.push(ValidationError::new(format!("{direction}[{i}]"), e.to_string()));
            }
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("`{}` is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_upstream_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| format!("`{raw}` is not a URL: {e}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("scheme `{}` is not http or https", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("URL has no host".to_string());
    }
    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return Err("only scheme, host and port may be given".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&RelayConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = RelayConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.upstream.connect_timeout_secs = 0;
        config.upstream.response_timeout_secs = 0;
        config.static_files.marker = "a/b".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "upstream.connect_timeout_secs",
                "upstream.response_timeout_secs",
                "static_files.marker",
            ]
        );
    }

    #[test]
    fn test_upstream_url_rules() {
        assert!(check_upstream_url("https://api.openai.com").is_ok());
        assert!(check_upstream_url("http://127.0.0.1:9000/").is_ok());
        assert!(check_upstream_url("api.openai.com").is_err());
        assert!(check_upstream_url("ftp://api.openai.com").is_err());
        assert!(check_upstream_url("https://api.openai.com/v1").is_err());
        assert!(check_upstream_url("https://api.openai.com/?a=b").is_err());
    }

    #[test]
    fn test_bad_header_rules_are_indexed() {
        let mut config = RelayConfig::default();
        config.headers.request.push("bad header".into());
        config.headers.response.push("^(".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "headers.request[2]");
        assert_eq!(errors[1].field, "headers.response[3]");
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = RelayConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "observability.metrics_address");
    }
}
