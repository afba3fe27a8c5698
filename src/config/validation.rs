//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (policies positive, timeouts > 0)
//! - Check addresses parse before the server tries to bind them
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{AppConfig, RatePolicyConfig};

/// A single semantic problem found in the configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),

    #[error("rate limit policy for '{0}' must allow at least one request")]
    ZeroMaxRequests(String),

    #[error("rate limit policy for '{0}' must have a positive window")]
    ZeroWindow(String),

    #[error("sweep interval must be positive")]
    ZeroSweepInterval,

    #[error("timeout '{0}' must be positive")]
    ZeroTimeout(&'static str),
}

/// Validate an [`AppConfig`], collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

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

    check_policy("default", &config.rate_limit.default, &mut errors);
    for (endpoint, policy) in &config.rate_limit.endpoints {
        check_policy(endpoint, policy, &mut errors);
    }

    if config.rate_limit.sweep_interval_secs == 0 {
        errors.push(ValidationError::ZeroSweepInterval);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }
    if config.timeouts.outbound_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("outbound_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_policy(name: &str, policy: &RatePolicyConfig, errors: &mut Vec<ValidationError>) {
    if policy.max_requests == 0 {
        errors.push(ValidationError::ZeroMaxRequests(name.to_string()));
    }
    if policy.window_secs == 0 {
        errors.push(ValidationError::ZeroWindow(name.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "not-an-address".to_string();
        config.rate_limit.default.max_requests = 0;
        config.timeouts.outbound_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::ZeroMaxRequests("default".to_string())));
        assert!(errors.contains(&ValidationError::ZeroTimeout("outbound_secs")));
    }

    #[test]
    fn test_zero_window_rejected_per_endpoint() {
        let mut config = AppConfig::default();
        config
            .rate_limit
            .endpoints
            .get_mut("/api/waitlist")
            .unwrap()
            .window_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::ZeroWindow("/api/waitlist".to_string())]
        );
    }
}
