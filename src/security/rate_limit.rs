//! Sliding-window rate limiting.
//!
//! Tracks, per (endpoint, client) key, the timestamps of recently admitted
//! requests. A request is admitted while strictly fewer than
//! `max_requests` timestamps fall inside the policy window; otherwise it
//! is rejected with the number of whole seconds until the oldest
//! in-window timestamp ages out.
//!
//! The table is sharded (`DashMap`), so the check-then-append sequence for
//! one key runs under that key's shard lock and two simultaneous requests
//! can never both take the last slot. Cross-key checks do not contend.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::config::schema::{RateLimitConfig, RatePolicyConfig};

/// An immutable per-endpoint admission policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatePolicy {
    /// Maximum admitted requests per window per client.
    pub max_requests: u32,
    /// Window length.
    pub window: Duration,
}

impl From<RatePolicyConfig> for RatePolicy {
    fn from(config: RatePolicyConfig) -> Self {
        Self {
            max_requests: config.max_requests,
            window: Duration::from_secs(config.window_secs),
        }
    }
}

/// Composite key identifying one client's window on one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WindowKey {
    endpoint: String,
    client: String,
}

impl WindowKey {
    /// Clients without a resolvable address share this bucket.
    pub const UNKNOWN_CLIENT: &'static str = "unknown";

    pub fn new(endpoint: &str, client: Option<&str>) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            client: client.unwrap_or(Self::UNKNOWN_CLIENT).to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Human-readable form used in security event details.
    pub fn label(&self) -> String {
        format!("ratelimit:{}:{}", self.endpoint, self.client)
    }
}

/// Outcome of one rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Whole seconds until a retry can succeed. Set only on rejection.
    pub retry_after_secs: Option<u64>,
}

impl RateLimitDecision {
    fn admitted() -> Self {
        Self {
            allowed: true,
            retry_after_secs: None,
        }
    }

    fn rejected(retry_after_secs: u64) -> Self {
        Self {
            allowed: false,
            retry_after_secs: Some(retry_after_secs),
        }
    }
}

/// Sliding-window rate limiter over a sharded window table.
pub struct SlidingWindowLimiter {
    default_policy: RatePolicy,
    policies: HashMap<String, RatePolicy>,
    windows: DashMap<WindowKey, Vec<Instant>>,
}

impl SlidingWindowLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let policies = config
            .endpoints
            .iter()
            .map(|(endpoint, policy)| (endpoint.clone(), RatePolicy::from(*policy)))
            .collect();
        Self {
            default_policy: RatePolicy::from(config.default),
            policies,
            windows: DashMap::new(),
        }
    }

    /// Policy for an endpoint, falling back to the default.
    pub fn policy_for(&self, endpoint: &str) -> RatePolicy {
        self.policies
            .get(endpoint)
            .copied()
            .unwrap_or(self.default_policy)
    }

    /// Check and, when admitted, record one request for (endpoint, client).
    pub fn check(&self, endpoint: &str, client: Option<&str>) -> RateLimitDecision {
        self.check_at(Instant::now(), endpoint, client)
    }

    pub(crate) fn check_at(
        &self,
        now: Instant,
        endpoint: &str,
        client: Option<&str>,
    ) -> RateLimitDecision {
        let policy = self.policy_for(endpoint);
        let key = WindowKey::new(endpoint, client);

        // The entry guard holds the shard lock for the whole
        // check-then-append sequence.
        let mut stamps = self.windows.entry(key).or_default();
        stamps.retain(|t| now.duration_since(*t) < policy.window);

        if stamps.len() as u32 >= policy.max_requests {
            // Admissions are appended in order, so the front is the oldest.
            let oldest = stamps
                .first()
                .copied()
                .unwrap_or(now);
            let remaining = policy.window.saturating_sub(now.duration_since(oldest));
            let retry_after = (remaining.as_millis() as u64).div_ceil(1000);
            return RateLimitDecision::rejected(retry_after);
        }

        stamps.push(now);
        RateLimitDecision::admitted()
    }

    /// Drop aged-out timestamps everywhere and remove emptied keys.
    pub fn sweep(&self) {
        self.sweep_at(Instant::now());
    }

    pub(crate) fn sweep_at(&self, now: Instant) {
        self.windows.retain(|key, stamps| {
            let window = self.policy_for(key.endpoint()).window;
            stamps.retain(|t| now.duration_since(*t) < window);
            !stamps.is_empty()
        });
    }

    /// Number of live (endpoint, client) keys.
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}
