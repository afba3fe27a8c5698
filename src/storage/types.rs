//! Storage types and error definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Postgres error code for a unique constraint violation. The storage
/// API surfaces it in its error body; it is the duplicate-email signal.
pub const UNIQUE_VIOLATION_CODE: &str = "23505";

/// The durable record created by a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistEntry {
    /// Normalized (trimmed, lower-cased) email address.
    pub email: String,
    /// Creation timestamp, RFC 3339.
    pub created_at: DateTime<Utc>,
}

/// Structured error body the storage API returns on failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageApiError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The email is already on the waitlist. Expected, not alarming.
    #[error("email already registered")]
    Duplicate,

    /// The insert call timed out.
    #[error("storage request timed out after {0} seconds")]
    Timeout(u64),

    /// The request never completed (connection, TLS, DNS).
    #[error("storage request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The storage API rejected the insert for another reason.
    #[error("storage rejected insert (status {status}): {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: u16,
        code: Option<String>,
        message: Option<String>,
    },

    /// The API answered success with a body we could not use.
    #[error("storage returned a malformed response: {0}")]
    Malformed(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
