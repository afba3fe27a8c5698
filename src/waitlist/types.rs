//! Submission request/response shapes and the workflow error taxonomy.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use thiserror::Error;

/// Inbound submission body.
///
/// Both fields default to empty so that presence validation stays in the
/// workflow (missing fields are a 400, not a deserialization failure).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default, rename = "captchaToken")]
    pub captcha_token: String,
}

/// Every way a submission can fail. One outcome class per condition;
/// none overlap. Stage-5 (email) failures never appear here.
#[derive(Debug, Error)]
pub enum WaitlistError {
    /// Storage collaborator unconfigured: a deployment failure.
    #[error("Database not configured. Please contact support.")]
    ConfigurationMissing,

    #[error("Email is required")]
    MissingEmail,

    #[error("Captcha verification required")]
    MissingCaptchaToken,

    /// Client address matched the suspicion heuristic.
    #[error("Request could not be processed")]
    SuspiciousClient,

    #[error("Too many requests. Please try again later.")]
    RateLimited { retry_after_secs: u64 },

    #[error("Captcha verification failed. Please try again.")]
    CaptchaFailed,

    /// Expected on resubmission; not an alarm condition.
    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Failed to add email to waitlist")]
    StorageFailure,

    /// Malformed body or other unexpected failure.
    #[error("Internal server error")]
    Internal,
}

impl WaitlistError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::ConfigurationMissing => StatusCode::SERVICE_UNAVAILABLE,
            Self::MissingEmail | Self::MissingCaptchaToken => StatusCode::BAD_REQUEST,
            Self::SuspiciousClient => StatusCode::BAD_REQUEST,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::CaptchaFailed => StatusCode::BAD_REQUEST,
            Self::DuplicateEmail => StatusCode::CONFLICT,
            Self::StorageFailure | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Outcome label for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::ConfigurationMissing => "configuration_missing",
            Self::MissingEmail | Self::MissingCaptchaToken => "invalid_input",
            Self::SuspiciousClient => "suspicious",
            Self::RateLimited { .. } => "rate_limited",
            Self::CaptchaFailed => "captcha_failed",
            Self::DuplicateEmail => "duplicate_email",
            Self::StorageFailure => "storage_failure",
            Self::Internal => "internal_failure",
        }
    }
}

impl IntoResponse for WaitlistError {
    fn into_response(self) -> Response {
        let status = self.status();
        let retry_after = match &self {
            Self::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        };

        let mut body = serde_json::json!({ "error": self.to_string() });
        if let Some(secs) = retry_after {
            body["retryAfter"] = secs.into();
        }

        let mut response = (status, Json(body)).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}
