//! Email provider client.
//!
//! # Responsibilities
//! - Send one message through the provider's v3 mail API
//! - Extract the provider message ID for log correlation
//! - Capture rejection status and body so failures log usefully
//!
//! The provider acknowledges with 202 Accepted; anything else is a
//! rejection whose body we keep verbatim for the warning log.

use std::time::Duration;

use tokio::time::timeout;

use crate::config::loader::EmailCredentials;
use crate::email::types::{DispatchReceipt, EmailError, EmailResult, OutboundEmail};

/// SendGrid's v3 send endpoint.
pub const SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// Response headers that may carry the provider message identifier.
const MESSAGE_ID_HEADERS: [&str; 2] = ["x-message-id", "x-request-id"];

/// Capability handle for confirmation email dispatch.
#[derive(Clone)]
pub enum EmailSender {
    Live(SendgridClient),
    Disabled,
}

impl EmailSender {
    pub fn live(credentials: EmailCredentials, http: reqwest::Client, call_timeout: Duration) -> Self {
        Self::Live(SendgridClient {
            http,
            api_key: credentials.api_key,
            from: credentials.from,
            api_url: SEND_URL.to_string(),
            call_timeout,
        })
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Live(_))
    }

    /// Point the live client at a different endpoint (tests). No-op when
    /// disabled.
    pub fn with_api_url(self, url: impl Into<String>) -> Self {
        match self {
            Self::Live(mut c) => {
                c.api_url = url.into();
                Self::Live(c)
            }
            Self::Disabled => Self::Disabled,
        }
    }
}

/// Live SendGrid client.
#[derive(Clone)]
pub struct SendgridClient {
    http: reqwest::Client,
    api_key: String,
    from: String,
    api_url: String,
    call_timeout: Duration,
}

impl SendgridClient {
    /// Send one message. 2xx is acceptance; everything else is rejection.
    pub async fn send(&self, message: &OutboundEmail) -> EmailResult<DispatchReceipt> {
        let payload = serde_json::json!({
            "personalizations": [{ "to": [{ "email": message.to }] }],
            "from": { "email": self.from },
            "subject": message.subject,
            "content": [
                { "type": "text/plain", "value": message.text },
                { "type": "text/html", "value": message.html },
            ],
            "categories": message.categories,
        });

        let request = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send();

        let response = timeout(self.call_timeout, request)
            .await
            .map_err(|_| EmailError::Timeout(self.call_timeout.as_secs()))??;

        let status = response.status();
        let message_id = MESSAGE_ID_HEADERS.iter().find_map(|name| {
            response
                .headers()
                .get(*name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        });

        if status.is_success() {
            return Ok(DispatchReceipt {
                status: status.as_u16(),
                message_id,
            });
        }

        let body = timeout(self.call_timeout, response.text())
            .await
            .map_err(|_| EmailError::Timeout(self.call_timeout.as_secs()))?
            .unwrap_or_default();

        Err(EmailError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_sender_reports_disabled() {
        assert!(!EmailSender::Disabled.is_enabled());
        let live = EmailSender::live(
            EmailCredentials {
                api_key: "k".to_string(),
                from: "hello@example.com".to_string(),
            },
            reqwest::Client::new(),
            Duration::from_secs(5),
        );
        assert!(live.is_enabled());
    }

    #[test]
    fn test_with_api_url_only_touches_live() {
        let sender = EmailSender::Disabled.with_api_url("http://localhost:1");
        assert!(!sender.is_enabled());
    }
}
