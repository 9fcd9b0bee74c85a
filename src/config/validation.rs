//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Require the upstream URL and access key
//! - Validate addresses, origins and limits
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderValue;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("upstream.url is required (SUPABASE_URL)")]
    MissingUpstreamUrl,

    #[error("upstream.anon_key is required (SUPABASE_ANON_KEY)")]
    MissingUpstreamKey,

    #[error("upstream.url {0:?} is not an absolute http(s) URL")]
    InvalidUpstreamUrl(String),

    #[error("listener.bind_address {0:?} is not a socket address")]
    InvalidBindAddress(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("cors origin {0:?} is not a valid origin")]
    InvalidOrigin(String),

    #[error("security.max_body_size must be greater than zero")]
    ZeroBodyLimit,

    #[error("security.content_security_policy must not be empty when headers are enabled")]
    EmptyContentSecurityPolicy,

    #[error("upstream.timeout_secs must be greater than zero")]
    ZeroTimeout,
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let upstream_url = config.upstream.url.trim();
    if upstream_url.is_empty() {
        errors.push(ValidationError::MissingUpstreamUrl);
    } else {
        match url::Url::parse(upstream_url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => {}
            _ => errors.push(ValidationError::InvalidUpstreamUrl(upstream_url.to_string())),
        }
    }

    if config.upstream.anon_key.trim().is_empty() {
        errors.push(ValidationError::MissingUpstreamKey);
    }

    if config.upstream.timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    for origin in config.cors.allowed_origins(config.environment) {
        let valid = url::Url::parse(&origin)
            .map(|u| u.has_host() && matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false)
            && HeaderValue::from_str(&origin).is_ok();
        if !valid {
            errors.push(ValidationError::InvalidOrigin(origin));
        }
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.security.enable_headers
        && (config.security.content_security_policy.trim().is_empty()
            || HeaderValue::from_str(&config.security.content_security_policy).is_err())
    {
        errors.push(ValidationError::EmptyContentSecurityPolicy);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
