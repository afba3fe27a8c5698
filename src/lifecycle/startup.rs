//! Ordered startup wiring.
//!
//! Turns validated config plus environment credentials into a runnable
//! server. Capability resolution (CAPTCHA, storage, email) happens here,
//! once, and each degraded mode is called out at startup so an operator
//! can tell a deliberate trade-off from a misconfiguration.

use std::sync::Arc;
use std::time::Duration;

use crate::captcha::CaptchaVerifier;
use crate::config::loader::Credentials;
use crate::config::schema::AppConfig;
use crate::email::EmailSender;
use crate::http::server::{AppState, HttpServer};
use crate::security::admission::AdmissionController;
use crate::storage::{StorageClient, StorageError};
use crate::waitlist::workflow::WaitlistService;

/// Build the server and its subsystems from config and credentials.
pub fn build_server(
    config: &AppConfig,
    credentials: Credentials,
) -> Result<HttpServer, StorageError> {
    let outbound_timeout = Duration::from_secs(config.timeouts.outbound_secs);
    let http = reqwest::Client::new();

    let storage = match credentials.storage {
        Some(creds) => Some(StorageClient::new(creds, http.clone(), outbound_timeout)?),
        None => {
            tracing::warn!("storage not configured, submissions will be rejected with 503");
            None
        }
    };

    let captcha = match credentials.captcha_secret {
        Some(secret) => CaptchaVerifier::live(secret, http.clone(), outbound_timeout),
        None => {
            tracing::warn!("captcha secret not configured, server-side verification disabled");
            CaptchaVerifier::Disabled
        }
    };

    let email = match credentials.email {
        Some(creds) => EmailSender::live(creds, http, outbound_timeout),
        None => {
            tracing::warn!("email provider not configured, confirmation emails disabled");
            EmailSender::Disabled
        }
    };

    let admission = Arc::new(AdmissionController::new(&config.rate_limit));
    let service = Arc::new(WaitlistService::new(
        admission.clone(),
        storage,
        captcha,
        email,
    ));

    let state = AppState {
        service,
        email_test_recipient: credentials.email_test_recipient,
    };

    Ok(HttpServer::new(config, admission, state))
}
