//! Structured logging initialization.
//!
//! # Design Decisions
//! - Uses the tracing crate for structured logging
//! - `RUST_LOG` wins; the config log level is the fallback filter
//! - Security events log under the dedicated `security` target at WARN

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// `fallback_level` is used when `RUST_LOG` is unset; it applies to this
/// crate while middleware noise stays at its own level.
pub fn init_tracing(fallback_level: &str) {
    let fallback = format!("waitlist_api={fallback_level},tower_http=info,security=warn");
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
