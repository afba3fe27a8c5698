//! CAPTCHA verification collaborator.
//!
//! Verification is an optional stage: with no secret configured the
//! verifier is built in its `Disabled` form and every check reports
//! `Skipped`. The enabled/disabled split is decided once at startup, so
//! the workflow has a single branch per submission instead of scattered
//! credential checks.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tokio::time::timeout;

/// hCaptcha's fixed verification URL.
pub const VERIFY_URL: &str = "https://hcaptcha.com/siteverify";

/// Errors from the verification call itself (not a failed verification).
#[derive(Debug, Error)]
pub enum CaptchaError {
    #[error("captcha verification timed out after {0} seconds")]
    Timeout(u64),

    #[error("captcha verification request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// What the verifier concluded about a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptchaOutcome {
    Passed,
    Failed { error_codes: Vec<String> },
    /// No secret configured; verification was bypassed.
    Skipped,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// Capability handle for CAPTCHA verification.
#[derive(Clone)]
pub enum CaptchaVerifier {
    Live(LiveVerifier),
    Disabled,
}

impl CaptchaVerifier {
    pub fn live(secret: String, http: reqwest::Client, call_timeout: Duration) -> Self {
        Self::Live(LiveVerifier {
            http,
            secret,
            verify_url: VERIFY_URL.to_string(),
            call_timeout,
        })
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Live(_))
    }

    /// Point the live verifier at a different endpoint (tests, regional
    /// deployments). No-op when disabled.
    pub fn with_verify_url(self, url: impl Into<String>) -> Self {
        match self {
            Self::Live(mut v) => {
                v.verify_url = url.into();
                Self::Live(v)
            }
            Self::Disabled => Self::Disabled,
        }
    }

    /// Verify a client-supplied token.
    pub async fn verify(&self, token: &str) -> Result<CaptchaOutcome, CaptchaError> {
        match self {
            Self::Live(verifier) => verifier.verify(token).await,
            Self::Disabled => Ok(CaptchaOutcome::Skipped),
        }
    }
}

/// Live hCaptcha verifier.
#[derive(Clone)]
pub struct LiveVerifier {
    http: reqwest::Client,
    secret: String,
    verify_url: String,
    call_timeout: Duration,
}

impl LiveVerifier {
    async fn verify(&self, token: &str) -> Result<CaptchaOutcome, CaptchaError> {
        let request = self
            .http
            .post(&self.verify_url)
            .form(&[("secret", self.secret.as_str()), ("response", token)])
            .send();

        let response = timeout(self.call_timeout, request)
            .await
            .map_err(|_| CaptchaError::Timeout(self.call_timeout.as_secs()))??;

        let verdict: VerifyResponse = timeout(self.call_timeout, response.json())
            .await
            .map_err(|_| CaptchaError::Timeout(self.call_timeout.as_secs()))??;

        if verdict.success {
            Ok(CaptchaOutcome::Passed)
        } else {
            Ok(CaptchaOutcome::Failed {
                error_codes: verdict.error_codes,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_verifier_always_skips() {
        let verifier = CaptchaVerifier::Disabled;
        assert!(!verifier.is_enabled());
        assert_eq!(
            verifier.verify("anything").await.unwrap(),
            CaptchaOutcome::Skipped
        );
    }

    #[test]
    fn test_verify_response_parses_error_codes() {
        let verdict: VerifyResponse = serde_json::from_str(
            r#"{"success": false, "error-codes": ["invalid-input-response"]}"#,
        )
        .unwrap();
        assert!(!verdict.success);
        assert_eq!(verdict.error_codes, vec!["invalid-input-response"]);

        // error-codes is absent on success.
        let verdict: VerifyResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(verdict.success);
        assert!(verdict.error_codes.is_empty());
    }
}
