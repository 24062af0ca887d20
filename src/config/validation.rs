//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Require at least one backend, each a well-formed `http` URL
//! - Validate value ranges (interval and timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BalancerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::BalancerConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no backend servers specified; at least one is required")]
    NoBackends,

    #[error("invalid backend address {address:?}: {reason}")]
    InvalidBackend { address: String, reason: String },

    #[error("health check path {0:?} must start with '/'")]
    InvalidHealthPath(String),

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Parse one backend address into the URL the balancer forwards to.
///
/// Only plain `http` with an explicit host is accepted.
pub fn parse_backend_address(address: &str) -> Result<Url, ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidBackend {
        address: address.to_string(),
        reason,
    };

    let url = Url::parse(address).map_err(|e| invalid(e.to_string()))?;
    if url.scheme() != "http" {
        return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

/// A health path is appended to the backend authority, so it must be absolute.
pub fn validate_health_path(path: &str) -> Result<(), ValidationError> {
    if path.starts_with('/') {
        Ok(())
    } else {
        Err(ValidationError::InvalidHealthPath(path.to_string()))
    }
}

/// Check a configuration, collecting every problem.
pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.backends.is_empty() {
        errors.push(ValidationError::NoBackends);
    }
    for address in &config.backends {
        if let Err(e) = parse_backend_address(address) {
            errors.push(e);
        }
    }

    if let Err(e) = validate_health_path(&config.health_check.path) {
        errors.push(e);
    }
    if config.health_check.interval_secs == 0 {
        errors.push(ValidationError::ZeroDuration("health_check.interval_secs"));
    }
    if config.health_check.timeout_secs == 0 {
        errors.push(ValidationError::ZeroDuration("health_check.timeout_secs"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::ZeroDuration("timeouts.upstream_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
