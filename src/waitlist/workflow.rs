//! The waitlist submission workflow.
//!
//! One inbound submission becomes at most one durable waitlist record.
//! Stages run strictly in order and each failure mode maps to exactly one
//! outcome class:
//!
//! 1. admission (suspicion, rate limit); rejection has no side effects
//!    beyond a security event
//! 2. validation (email and token presence, storage configured)
//! 3. CAPTCHA verification; skipped entirely when no secret is
//!    configured, a logged degradation rather than a silent gap
//! 4. durable insertion, the sole required side effect
//! 5. confirmation email; best-effort, failures logged and swallowed
//! 6. response synthesis

use std::sync::Arc;

use chrono::Utc;

use crate::captcha::{CaptchaOutcome, CaptchaVerifier};
use crate::email::{EmailError, EmailSender, OutboundEmail};
use crate::observability::metrics;
use crate::security::admission::{AdmissionController, AdmissionDecision};
use crate::security::client_addr::ClientMeta;
use crate::security::events::{self, SecurityEvent, SecurityEventKind};
use crate::storage::{StorageClient, StorageError, WaitlistEntry};
use crate::waitlist::types::{SubmitRequest, WaitlistError};

/// Endpoint identifier used for admission policy lookup and event logs.
pub const WAITLIST_ENDPOINT: &str = "/api/waitlist";

/// Orchestrates one submission end to end.
pub struct WaitlistService {
    admission: Arc<AdmissionController>,
    storage: Option<StorageClient>,
    captcha: CaptchaVerifier,
    email: EmailSender,
}

impl WaitlistService {
    pub fn new(
        admission: Arc<AdmissionController>,
        storage: Option<StorageClient>,
        captcha: CaptchaVerifier,
        email: EmailSender,
    ) -> Self {
        Self {
            admission,
            storage,
            captcha,
            email,
        }
    }

    pub fn email_sender(&self) -> &EmailSender {
        &self.email
    }

    /// Run the full submission workflow.
    pub async fn submit(
        &self,
        meta: &ClientMeta,
        request: SubmitRequest,
    ) -> Result<WaitlistEntry, WaitlistError> {
        // Stage 1: admission. A rejection stops everything downstream.
        match self.admission.admit(WAITLIST_ENDPOINT, meta) {
            AdmissionDecision::Admitted => {}
            AdmissionDecision::Suspicious => return Err(WaitlistError::SuspiciousClient),
            AdmissionDecision::RateLimited { retry_after_secs } => {
                return Err(WaitlistError::RateLimited { retry_after_secs })
            }
        }

        // Stage 2: validation.
        let email = request.email.trim();
        if email.is_empty() {
            return Err(WaitlistError::MissingEmail);
        }
        if request.captcha_token.trim().is_empty() {
            return Err(WaitlistError::MissingCaptchaToken);
        }
        let storage = self
            .storage
            .as_ref()
            .ok_or(WaitlistError::ConfigurationMissing)?;

        // Stage 3: CAPTCHA verification (optional).
        match self.captcha.verify(&request.captcha_token).await {
            Ok(CaptchaOutcome::Passed) => {}
            Ok(CaptchaOutcome::Skipped) => {
                tracing::warn!("captcha secret not configured, skipping server-side verification");
            }
            Ok(CaptchaOutcome::Failed { error_codes }) => {
                events::emit(
                    &SecurityEvent::new(
                        SecurityEventKind::FailedAuthentication,
                        WAITLIST_ENDPOINT,
                        meta,
                    )
                    .with_details(serde_json::json!({ "errorCodes": error_codes })),
                );
                return Err(WaitlistError::CaptchaFailed);
            }
            Err(e) => {
                // Verifier unreachable or slow: the stage failed, so the
                // submission fails closed, same outcome class.
                tracing::error!(error = %e, "captcha verification call failed");
                return Err(WaitlistError::CaptchaFailed);
            }
        }

        // Stage 4: durable insertion, the one required side effect.
        let normalized = email.to_lowercase();
        let entry = match storage.insert_entry(&normalized, Utc::now()).await {
            Ok(entry) => entry,
            Err(StorageError::Duplicate) => return Err(WaitlistError::DuplicateEmail),
            Err(e) => {
                tracing::error!(error = %e, "waitlist insert failed");
                return Err(WaitlistError::StorageFailure);
            }
        };

        // Stage 5: confirmation email. The record exists; nothing that
        // happens here may change the submission's outcome.
        self.dispatch_confirmation(&entry.email).await;

        // Stage 6: the caller turns the entry into the 201 response.
        Ok(entry)
    }

    async fn dispatch_confirmation(&self, recipient: &str) {
        let client = match &self.email {
            EmailSender::Live(client) => client,
            EmailSender::Disabled => {
                tracing::warn!("email provider not configured, skipping confirmation email");
                metrics::record_email_dispatch("skipped");
                return;
            }
        };

        match client.send(&confirmation_email(recipient)).await {
            Ok(receipt) => {
                tracing::info!(
                    status = receipt.status,
                    message_id = receipt.message_id.as_deref().unwrap_or(""),
                    "confirmation email dispatched"
                );
                metrics::record_email_dispatch("sent");
            }
            Err(EmailError::Rejected { status, body }) => {
                tracing::warn!(status, body = %body, "confirmation email rejected by provider");
                metrics::record_email_dispatch("failed");
            }
            Err(e) => {
                tracing::warn!(error = %e, "confirmation email send failed");
                metrics::record_email_dispatch("failed");
            }
        }
    }
}

/// The message a successful signup receives.
fn confirmation_email(recipient: &str) -> OutboundEmail {
    OutboundEmail {
        to: recipient.to_string(),
        subject: "You're on the waitlist".to_string(),
        text: "Thanks for signing up! We'll let you know as soon as your spot opens up."
            .to_string(),
        html: "<p>Thanks for signing up! We'll let you know as soon as your spot opens up.</p>"
            .to_string(),
        categories: vec!["waitlist-confirmation".to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RateLimitConfig;

    fn service_without_storage() -> WaitlistService {
        WaitlistService::new(
            Arc::new(AdmissionController::new(&RateLimitConfig::default())),
            None,
            CaptchaVerifier::Disabled,
            EmailSender::Disabled,
        )
    }

    fn request(email: &str, token: &str) -> SubmitRequest {
        SubmitRequest {
            email: email.to_string(),
            captcha_token: token.to_string(),
        }
    }

    #[tokio::test]
    async fn test_missing_email_rejected_before_storage_check() {
        let service = service_without_storage();
        let err = service
            .submit(&ClientMeta::default(), request("   ", "tok"))
            .await
            .unwrap_err();
        assert!(matches!(err, WaitlistError::MissingEmail));
    }

    #[tokio::test]
    async fn test_missing_captcha_token_rejected() {
        let service = service_without_storage();
        let err = service
            .submit(&ClientMeta::default(), request("a@b.c", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, WaitlistError::MissingCaptchaToken));
    }

    #[tokio::test]
    async fn test_unconfigured_storage_is_a_deployment_error() {
        let service = service_without_storage();
        let err = service
            .submit(&ClientMeta::default(), request("a@b.c", "tok"))
            .await
            .unwrap_err();
        assert!(matches!(err, WaitlistError::ConfigurationMissing));
    }

    #[tokio::test]
    async fn test_suspicious_client_stops_at_admission() {
        let service = service_without_storage();
        let meta = ClientMeta {
            addr: Some("127.0.0.1".to_string()),
            user_agent: None,
        };
        // Even a request that would fail validation is rejected at the
        // gate first.
        let err = service.submit(&meta, request("", "")).await.unwrap_err();
        assert!(matches!(err, WaitlistError::SuspiciousClient));
    }

    #[test]
    fn test_confirmation_email_shape() {
        let message = confirmation_email("foo@bar.com");
        assert_eq!(message.to, "foo@bar.com");
        assert!(!message.subject.is_empty());
        assert!(message.html.contains("<p>"));
        assert_eq!(message.categories, vec!["waitlist-confirmation"]);
    }
}
