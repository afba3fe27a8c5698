//! Configuration schema definitions.
//!
//! This module defines the tunable configuration for the API server.
//! All types derive Serde traits for deserialization from config files.
//! Secrets and collaborator credentials are never part of this file-based
//! schema; they come from the environment (see `loader::Credentials`).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the API server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Request hardening settings.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
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

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Timeout for each outbound collaborator call in seconds.
    pub outbound_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            outbound_secs: 10,
        }
    }
}

/// One sliding-window rate limit policy.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct RatePolicyConfig {
    /// Maximum admitted requests per window per client.
    pub max_requests: u32,

    /// Window length in seconds.
    pub window_secs: u64,
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Fallback policy for endpoints without a specific policy.
    pub default: RatePolicyConfig,

    /// Per-endpoint policy overrides, keyed by request path.
    pub endpoints: HashMap<String, RatePolicyConfig>,

    /// Background sweep period for aged-out window entries, in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        let mut endpoints = HashMap::new();
        // The waitlist endpoint is the abuse target; keep it tight.
        endpoints.insert(
            "/api/waitlist".to_string(),
            RatePolicyConfig {
                max_requests: 5,
                window_secs: 60,
            },
        );
        Self {
            default: RatePolicyConfig {
                max_requests: 30,
                window_secs: 60,
            },
            endpoints,
            sweep_interval_secs: 300,
        }
    }
}

/// Request hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            // Bodies are a single small JSON object.
            max_body_size: 64 * 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.timeouts.request_secs, 30);
        assert_eq!(config.rate_limit.default.max_requests, 30);
        assert_eq!(config.rate_limit.sweep_interval_secs, 300);

        let waitlist = config
            .rate_limit
            .endpoints
            .get("/api/waitlist")
            .expect("waitlist policy present by default");
        assert_eq!(waitlist.max_requests, 5);
        assert_eq!(waitlist.window_secs, 60);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [rate_limit.endpoints."/api/waitlist"]
            max_requests = 2
            window_secs = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.timeouts.outbound_secs, 10);
        assert_eq!(config.rate_limit.endpoints["/api/waitlist"].max_requests, 2);
    }
}
