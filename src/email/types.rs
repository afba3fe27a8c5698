//! Email provider types and error definitions.

use serde::Serialize;
use thiserror::Error;

/// One outbound message, provider-agnostic shape.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
    /// Provider-side analytics tags.
    pub categories: Vec<String>,
}

/// Evidence that the provider accepted a message.
#[derive(Debug, Clone)]
pub struct DispatchReceipt {
    pub status: u16,
    /// Provider message identifier, when the response carries one.
    pub message_id: Option<String>,
}

/// Errors that can occur sending a message.
///
/// The workflow logs these and moves on; nothing here may change a
/// submission's outcome.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("email send timed out after {0} seconds")]
    Timeout(u64),

    #[error("email send failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("email provider rejected send (status {status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Result type for email operations.
pub type EmailResult<T> = Result<T, EmailError>;
