//! Storage API client for waitlist inserts.
//!
//! # Responsibilities
//! - Insert one waitlist row and return its representation
//! - Map the API's uniqueness violation to the duplicate outcome
//! - Handle timeouts and transport errors distinctly
//!
//! Speaks the PostgREST dialect the managed backend exposes: a `POST` to
//! the table endpoint with service-role headers, `Prefer:
//! return=representation` to get the created row back.

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

use crate::config::loader::StorageCredentials;
use crate::storage::types::{
    StorageApiError, StorageError, StorageResult, WaitlistEntry, UNIQUE_VIOLATION_CODE,
};

const WAITLIST_TABLE: &str = "waitlist";

/// Client for the durable storage collaborator.
#[derive(Clone)]
pub struct StorageClient {
    http: reqwest::Client,
    insert_url: Url,
    service_key: String,
    call_timeout: Duration,
}

impl StorageClient {
    pub fn new(
        credentials: StorageCredentials,
        http: reqwest::Client,
        call_timeout: Duration,
    ) -> StorageResult<Self> {
        let insert_url = credentials
            .url
            .join(&format!("rest/v1/{WAITLIST_TABLE}"))
            .map_err(|e| StorageError::Malformed(format!("bad storage URL: {e}")))?;

        Ok(Self {
            http,
            insert_url,
            service_key: credentials.service_key,
            call_timeout,
        })
    }

    /// Insert one waitlist entry, returning the stored representation.
    ///
    /// The email must already be normalized; this client does not reshape
    /// input. Uniqueness is enforced by the table, not here.
    pub async fn insert_entry(
        &self,
        email: &str,
        created_at: DateTime<Utc>,
    ) -> StorageResult<WaitlistEntry> {
        let row = serde_json::json!([{
            "email": email,
            "created_at": created_at.to_rfc3339(),
        }]);

        let request = self
            .http
            .post(self.insert_url.clone())
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header("Prefer", "return=representation")
            .json(&row)
            .send();

        let response = timeout(self.call_timeout, request)
            .await
            .map_err(|_| StorageError::Timeout(self.call_timeout.as_secs()))??;

        let status = response.status();
        let body = timeout(self.call_timeout, response.text())
            .await
            .map_err(|_| StorageError::Timeout(self.call_timeout.as_secs()))??;

        if status.is_success() {
            return parse_representation(&body);
        }

        Err(classify_rejection(status, &body))
    }
}

/// The API returns the created rows as an array.
fn parse_representation(body: &str) -> StorageResult<WaitlistEntry> {
    let rows: Vec<WaitlistEntry> = serde_json::from_str(body)
        .map_err(|e| StorageError::Malformed(format!("unparseable insert response: {e}")))?;
    rows.into_iter()
        .next()
        .ok_or_else(|| StorageError::Malformed("insert response contained no rows".to_string()))
}

/// Map a non-success response to the right error class.
///
/// A uniqueness violation arrives as HTTP 409 and/or the Postgres
/// `23505` code in the body; either signal alone is enough.
fn classify_rejection(status: StatusCode, body: &str) -> StorageError {
    let api_error: StorageApiError = serde_json::from_str(body).unwrap_or_default();

    let duplicate_code = api_error.code.as_deref() == Some(UNIQUE_VIOLATION_CODE);
    if status == StatusCode::CONFLICT || duplicate_code {
        return StorageError::Duplicate;
    }

    StorageError::Rejected {
        status: status.as_u16(),
        code: api_error.code,
        message: api_error.message,
    }
}
