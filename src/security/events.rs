//! Security event records and emission.
//!
//! Events are constructed at the moment of detection and handed to the
//! logging collaborator. They are never persisted, never mutated, and
//! emission can never fail back into the caller.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::security::client_addr::ClientMeta;

/// Classification of a notable admission or workflow outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityEventKind {
    RateLimitExceeded,
    InvalidRequest,
    UnauthorizedAccess,
    SuspiciousActivity,
    FailedAuthentication,
    ApiAbuse,
}

impl SecurityEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RateLimitExceeded => "rate_limit_exceeded",
            Self::InvalidRequest => "invalid_request",
            Self::UnauthorizedAccess => "unauthorized_access",
            Self::SuspiciousActivity => "suspicious_activity",
            Self::FailedAuthentication => "failed_authentication",
            Self::ApiAbuse => "api_abuse",
        }
    }
}

/// An immutable record of a notable security decision.
#[derive(Debug, Clone, Serialize)]
pub struct SecurityEvent {
    pub kind: SecurityEventKind,
    pub endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_addr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

impl SecurityEvent {
    pub fn new(kind: SecurityEventKind, endpoint: &str, meta: &ClientMeta) -> Self {
        Self {
            kind,
            endpoint: endpoint.to_string(),
            client_addr: meta.addr.clone(),
            user_agent: meta.user_agent.clone(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Forward an event to the logging collaborator.
///
/// Infallible by contract: a failure to render details degrades to an
/// empty field rather than reaching the caller.
pub fn emit(event: &SecurityEvent) {
    let details = event
        .details
        .as_ref()
        .map(|d| d.to_string())
        .unwrap_or_default();

    tracing::warn!(
        target: "security",
        kind = event.kind.as_str(),
        endpoint = %event.endpoint,
        client_addr = event.client_addr.as_deref().unwrap_or("unknown"),
        user_agent = event.user_agent.as_deref().unwrap_or(""),
        details = %details,
        timestamp = %event.timestamp.to_rfc3339(),
        "security event"
    );
}
