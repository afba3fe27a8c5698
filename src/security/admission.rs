//! Request admission control.
//!
//! Gatekeeps every submission before any downstream work happens:
//! suspicion heuristic first, then the sliding-window rate limit. Notable
//! rejections are emitted as security events and counted.
//!
//! The controller is an explicitly owned component, constructed once at
//! startup and injected where needed; its window table lives and dies
//! with the process.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::schema::RateLimitConfig;
use crate::observability::metrics;
use crate::security::client_addr::{is_suspicious, ClientMeta};
use crate::security::events::{self, SecurityEvent, SecurityEventKind};
use crate::security::rate_limit::{RateLimitDecision, SlidingWindowLimiter, WindowKey};

/// Outcome of the admission check for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDecision {
    Admitted,
    /// Client address matched the suspicion heuristic.
    Suspicious,
    /// Window exhausted; retry after the given number of whole seconds.
    RateLimited { retry_after_secs: u64 },
}

/// Per-endpoint admission controller.
pub struct AdmissionController {
    limiter: SlidingWindowLimiter,
    sweep_interval: Duration,
}

impl AdmissionController {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            limiter: SlidingWindowLimiter::new(config),
            sweep_interval: Duration::from_secs(config.sweep_interval_secs),
        }
    }

    /// Decide whether a request may proceed.
    ///
    /// Rejections are logged as security events here; the caller only
    /// turns the decision into a response.
    pub fn admit(&self, endpoint: &str, meta: &ClientMeta) -> AdmissionDecision {
        if is_suspicious(meta.addr.as_deref()) {
            events::emit(&SecurityEvent::new(
                SecurityEventKind::SuspiciousActivity,
                endpoint,
                meta,
            ));
            metrics::record_admission(endpoint, "suspicious");
            return AdmissionDecision::Suspicious;
        }

        let decision = self.limiter.check(endpoint, meta.addr.as_deref());
        match decision {
            RateLimitDecision { allowed: true, .. } => {
                metrics::record_admission(endpoint, "admitted");
                AdmissionDecision::Admitted
            }
            RateLimitDecision {
                retry_after_secs, ..
            } => {
                let key = WindowKey::new(endpoint, meta.addr.as_deref());
                events::emit(
                    &SecurityEvent::new(SecurityEventKind::RateLimitExceeded, endpoint, meta)
                        .with_details(serde_json::json!({ "rateLimitKey": key.label() })),
                );
                metrics::record_admission(endpoint, "rate_limited");
                AdmissionDecision::RateLimited {
                    // A rejection always carries a retry hint.
                    retry_after_secs: retry_after_secs.unwrap_or(1),
                }
            }
        }
    }

    /// Drop aged-out window state. Exposed for the background sweeper.
    pub fn sweep(&self) {
        self.limiter.sweep();
        tracing::debug!(
            tracked_keys = self.limiter.tracked_keys(),
            "rate limit sweep complete"
        );
    }

    /// Spawn the periodic sweep task, tied to the shutdown signal.
    pub fn spawn_sweeper(
        self: &Arc<Self>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        let controller = Arc::clone(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(controller.sweep_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // interval fires immediately once; nothing to sweep yet.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => controller.sweep(),
                    _ = shutdown.recv() => {
                        tracing::debug!("rate limit sweeper stopping");
                        break;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RatePolicyConfig;
    use crate::lifecycle::Shutdown;

    fn controller(max_requests: u32, window_secs: u64) -> AdmissionController {
        let mut config = RateLimitConfig::default();
        config.endpoints.insert(
            "/api/waitlist".to_string(),
            RatePolicyConfig {
                max_requests,
                window_secs,
            },
        );
        AdmissionController::new(&config)
    }

    fn meta(addr: &str) -> ClientMeta {
        ClientMeta {
            addr: Some(addr.to_string()),
            user_agent: Some("test-agent".to_string()),
        }
    }

    #[test]
    fn test_suspicious_rejected_before_rate_limiting() {
        let controller = controller(1, 60);

        // Suspicion check never consumes a rate limit slot.
        assert_eq!(
            controller.admit("/api/waitlist", &meta("127.0.0.1")),
            AdmissionDecision::Suspicious
        );
        assert_eq!(
            controller.admit("/api/waitlist", &meta("127.0.0.1")),
            AdmissionDecision::Suspicious
        );
    }

    #[test]
    fn test_admission_then_rate_limited() {
        let controller = controller(2, 60);
        let meta = meta("203.0.113.7");

        assert_eq!(
            controller.admit("/api/waitlist", &meta),
            AdmissionDecision::Admitted
        );
        assert_eq!(
            controller.admit("/api/waitlist", &meta),
            AdmissionDecision::Admitted
        );
        match controller.admit("/api/waitlist", &meta) {
            AdmissionDecision::RateLimited { retry_after_secs } => {
                assert!((1..=60).contains(&retry_after_secs));
            }
            other => panic!("expected rate limited, got {other:?}"),
        }
    }

    #[test]
    fn test_absent_address_is_admitted_not_suspicious() {
        let controller = controller(1, 60);
        assert_eq!(
            controller.admit("/api/waitlist", &ClientMeta::default()),
            AdmissionDecision::Admitted
        );
    }

    #[tokio::test]
    async fn test_sweeper_stops_on_shutdown() {
        let mut config = RateLimitConfig::default();
        config.sweep_interval_secs = 1;
        let controller = Arc::new(AdmissionController::new(&config));

        let shutdown = Shutdown::new();
        let handle = controller.spawn_sweeper(shutdown.subscribe());

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("sweeper should exit promptly on shutdown")
            .unwrap();
    }
}
