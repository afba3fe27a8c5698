//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, security target)
//!     → metrics.rs (admission / submission / email counters)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields over message interpolation
//! - Request ID flows through all handler logs
//! - Metrics are cheap (atomic increments) and never gate behavior

pub mod logging;
pub mod metrics;
