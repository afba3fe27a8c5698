//! Waitlist Landing API
//!
//! A small production API backing a product landing page.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                   WAITLIST API                   │
//!                      │                                                  │
//!   POST /api/waitlist │  ┌─────────┐    ┌───────────┐    ┌────────────┐  │
//!   ──────────────────►│  │  http   │───►│ security  │───►│  waitlist  │  │
//!                      │  │ server  │    │ admission │    │  workflow  │  │
//!                      │  └─────────┘    └───────────┘    └─────┬──────┘  │
//!                      │                                        │         │
//!                      │            ┌──────────────┬────────────┤         │
//!                      │            ▼              ▼            ▼         │
//!                      │      ┌──────────┐   ┌──────────┐  ┌──────────┐   │
//!                      │      │ captcha  │   │ storage  │  │  email   │   │
//!                      │      │(optional)│   │(required)│  │  (best-  │   │
//!                      │      └──────────┘   └──────────┘  │  effort) │   │
//!                      │                                   └──────────┘   │
//!                      │  ┌────────────────────────────────────────────┐  │
//!                      │  │           Cross-Cutting Concerns           │  │
//!                      │  │     config · observability · lifecycle     │  │
//!                      │  └────────────────────────────────────────────┘  │
//!                      └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use waitlist_api::config::loader::{load_config, Credentials};
use waitlist_api::lifecycle::startup::build_server;
use waitlist_api::lifecycle::Shutdown;
use waitlist_api::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "waitlist-api", version, about = "Waitlist landing API server")]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // The subscriber needs the configured level, so config loads first;
    // loader failures surface through main's error return instead.
    let config = load_config(cli.config.as_deref())?;
    logging::init_tracing(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        sweep_interval_secs = config.rate_limit.sweep_interval_secs,
        "Configuration loaded"
    );

    let credentials = Credentials::from_env()?;
    tracing::info!(
        storage = credentials.storage.is_some(),
        captcha = credentials.captcha_secret.is_some(),
        email = credentials.email.is_some(),
        "Collaborator capabilities resolved"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    let server = build_server(&config, credentials)?;
    server.run(listener, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
