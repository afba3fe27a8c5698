//! Metrics collection and exposition.
//!
//! # Metrics
//! - `waitlist_admissions_total` (counter): admission outcomes by endpoint
//! - `waitlist_submissions_total` (counter): submission outcomes
//! - `waitlist_email_dispatch_total` (counter): confirmation send results
//!
//! # Design Decisions
//! - Recording is a cheap atomic increment; callers never branch on it
//! - The Prometheus exporter is optional and bound from config

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one admission decision.
pub fn record_admission(endpoint: &str, outcome: &'static str) {
    counter!(
        "waitlist_admissions_total",
        "endpoint" => endpoint.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record one submission outcome class.
pub fn record_submission(outcome: &'static str) {
    counter!("waitlist_submissions_total", "outcome" => outcome).increment(1);
}

/// Record one confirmation email dispatch result.
pub fn record_email_dispatch(result: &'static str) {
    counter!("waitlist_email_dispatch_total", "result" => result).increment(1);
}
