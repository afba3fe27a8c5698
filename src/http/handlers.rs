//! Request handlers.
//!
//! Handlers stay thin: classify the client, hand off to the workflow,
//! map the result onto the wire. All policy lives in the workflow and
//! the admission controller.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::email::{EmailError, EmailSender};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::client_addr::ClientMeta;
use crate::security::events::{self, SecurityEvent, SecurityEventKind};
use crate::waitlist::types::{SubmitRequest, WaitlistError};
use crate::waitlist::workflow::WAITLIST_ENDPOINT;

/// `POST /api/waitlist`
pub async fn submit_waitlist(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> Response {
    let meta = ClientMeta::from_headers(&headers);

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            // Malformed body: internal-failure class, logged as an event.
            events::emit(
                &SecurityEvent::new(SecurityEventKind::InvalidRequest, WAITLIST_ENDPOINT, &meta)
                    .with_details(serde_json::json!({ "error": rejection.body_text() })),
            );
            metrics::record_submission(WaitlistError::Internal.outcome());
            return WaitlistError::Internal.into_response();
        }
    };

    match state.service.submit(&meta, request).await {
        Ok(entry) => {
            metrics::record_submission("accepted");
            (
                StatusCode::CREATED,
                Json(serde_json::json!({
                    "message": "Successfully added to waitlist",
                    "data": entry,
                })),
            )
                .into_response()
        }
        Err(error) => {
            metrics::record_submission(error.outcome());
            error.into_response()
        }
    }
}

/// `GET /api/email/test`: readiness probe for the diagnostic sender.
pub async fn email_test_ready() -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "ok": true,
            "message": "Email test endpoint ready. Use POST to send.",
        })),
    )
        .into_response()
}

/// `POST /api/email/test`: one-shot diagnostic send.
///
/// Diagnostic only: no admission control beyond the global middleware,
/// no correctness guarantees. Useful to confirm provider credentials
/// without touching the waitlist.
pub async fn email_test_send(State(state): State<AppState>) -> Response {
    let client = match state.service.email_sender() {
        EmailSender::Live(client) => client,
        EmailSender::Disabled => {
            return diagnostic_error("Missing email provider credentials", None);
        }
    };

    let Some(recipient) = state.email_test_recipient.clone() else {
        return diagnostic_error("Missing EMAIL_TEST_RECIPIENT", None);
    };

    let message = crate::email::OutboundEmail {
        to: recipient,
        subject: "Waitlist API test message".to_string(),
        text: "Test message from the waitlist API.".to_string(),
        html: "<strong>Test message from the waitlist API.</strong>".to_string(),
        categories: vec!["email-test".to_string()],
    };

    match client.send(&message).await {
        Ok(receipt) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "ok": true,
                "statusCode": receipt.status,
                "requestId": receipt.message_id,
            })),
        )
            .into_response(),
        Err(EmailError::Rejected { status, body }) => diagnostic_error(
            &format!("Provider rejected send with status {status}"),
            Some(body),
        ),
        Err(e) => diagnostic_error(&e.to_string(), None),
    }
}

fn diagnostic_error(message: &str, body: Option<String>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({
            "ok": false,
            "message": message,
            "body": body,
        })),
    )
        .into_response()
}

/// `GET /health`
pub async fn health() -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
        .into_response()
}
