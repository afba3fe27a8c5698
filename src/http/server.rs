//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit,
//!   security headers)
//! - Serve with graceful shutdown
//! - Own the background sweep task's lifecycle

use std::sync::Arc;
use std::time::Duration;

use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tokio::net::TcpListener;
use axum::extract::DefaultBodyLimit;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::schema::AppConfig;
use crate::http::handlers;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::Shutdown;
use crate::security::admission::AdmissionController;
use crate::security::headers::apply_security_headers;
use crate::waitlist::workflow::WaitlistService;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<WaitlistService>,
    /// Recipient for the diagnostic email endpoint, when configured.
    pub email_test_recipient: Option<String>,
}

/// HTTP server for the waitlist API.
pub struct HttpServer {
    router: Router,
    admission: Arc<AdmissionController>,
}

impl HttpServer {
    /// Assemble the server from its already-constructed collaborators.
    pub fn new(config: &AppConfig, admission: Arc<AdmissionController>, state: AppState) -> Self {
        let router = Self::build_router(config, state);
        Self { router, admission }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/api/waitlist", post(handlers::submit_waitlist))
            .route(
                "/api/email/test",
                get(handlers::email_test_ready).post(handlers::email_test_send),
            )
            .route("/health", get(handlers::health))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    )))
                    .layer(DefaultBodyLimit::max(config.security.max_body_size))
                    .layer(middleware::from_fn(apply_security_headers))
                    .layer(propagate_request_id_layer()),
            )
    }

    /// Run the server until the shutdown signal fires.
    ///
    /// Also owns the rate-limit sweeper: started here, stopped by the
    /// same signal that drains the listener.
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let sweeper = self.admission.spawn_sweeper(shutdown.subscribe());

        let mut signal = shutdown.subscribe();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = signal.recv().await;
            })
            .await?;

        // The listener is drained; the sweeper got the same broadcast.
        let _ = sweeper.await;
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
