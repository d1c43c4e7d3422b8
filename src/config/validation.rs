//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, origin URLs and header names
//! - Validate value ranges (timeouts > 0, limits > 0)
//! - Reject route prefixes that would shadow the application
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EdgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue};
use url::Url;

use crate::config::schema::EdgeConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Check the whole configuration, collecting every error found.
pub fn validate_config(config: &EdgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::new("listener.max_connections", "must be greater than 0"));
    }

    for (field, value) in [
        ("timeouts.connect_secs", config.timeouts.connect_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("timeouts.upstream_secs", config.timeouts.upstream_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than 0"));
        }
    }

    // The edge timeout must outlast the outbound fetch so a slow origin
    // surfaces as 504 rather than the edge's own 408.
    if config.timeouts.upstream_secs >= config.timeouts.request_secs {
        errors.push(ValidationError::new(
            "timeouts.upstream_secs",
            format!(
                "must be less than timeouts.request_secs ({})",
                config.timeouts.request_secs
            ),
        ));
    }

    for prefix in config.assets.prefixes.iter().chain(&config.assets.exact_paths) {
        check_path(&mut errors, "assets.prefixes", prefix);
    }
    for ext in &config.assets.extensions {
        if ext.trim_start_matches('.').is_empty() || ext.contains('/') {
            errors.push(ValidationError::new("assets.extensions", format!("invalid extension '{ext}'")));
        }
    }

    if HeaderValue::from_str(&config.assets.default_cache_control).is_err() {
        errors.push(ValidationError::new(
            "assets.default_cache_control",
            "is not a valid header value",
        ));
    }

    check_path(&mut errors, "docs.prefix", &config.docs.prefix);
    if config.docs.prefix.trim_end_matches('/').is_empty() {
        errors.push(ValidationError::new("docs.prefix", "must not be the root path"));
    }
    if let Some(origin) = &config.docs.origin {
        check_origin(&mut errors, "docs.origin", origin);
    }
    if let Some(host) = &config.docs.host {
        if host.trim().is_empty() {
            errors.push(ValidationError::new("docs.host", "must not be empty"));
        }
    }
    for name in config
        .docs
        .strip_request_headers
        .iter()
        .chain(&config.docs.strip_response_headers)
    {
        check_header(&mut errors, "docs.strip_headers", name);
    }

    check_origin(&mut errors, "app.origin", &config.app.origin);
    check_header(&mut errors, "app.permissions_header", &config.app.permissions_header);
    for gate in &config.app.gates {
        check_path(&mut errors, "app.gates.path_prefix", &gate.path_prefix);
        if gate.permission.trim().is_empty() {
            errors.push(ValidationError::new("app.gates.permission", "must not be empty"));
        }
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than 0"));
    }

    if !matches!(config.observability.log_format.as_str(), "json" | "pretty") {
        errors.push(ValidationError::new(
            "observability.log_format",
            format!("'{}' is not one of json, pretty", config.observability.log_format),
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_path(errors: &mut Vec<ValidationError>, field: &str, path: &str) {
    if !path.starts_with('/') {
        errors.push(ValidationError::new(field, format!("'{path}' must start with '/'")));
    }
}

fn check_origin(errors: &mut Vec<ValidationError>, field: &str, origin: &str) {
    match Url::parse(origin) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
        Ok(_) => errors.push(ValidationError::new(field, format!("'{origin}' must be an http(s) URL"))),
        Err(e) => errors.push(ValidationError::new(field, format!("'{origin}': {e}"))),
    }
}

fn check_header(errors: &mut Vec<ValidationError>, field: &str, name: &str) {
    if HeaderName::from_bytes(name.as_bytes()).is_err() {
        errors.push(ValidationError::new(field, format!("'{name}' is not a valid header name")));
    }
}
