//! Shared utilities for integration testing.
//!
//! Spins up mock collaborators (storage API, CAPTCHA verifier, email
//! provider) as tiny Axum apps on ephemeral ports, plus the server under
//! test wired to them.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tokio::net::TcpListener;

use waitlist_api::captcha::CaptchaVerifier;
use waitlist_api::config::loader::{EmailCredentials, StorageCredentials};
use waitlist_api::config::schema::{AppConfig, RatePolicyConfig};
use waitlist_api::email::EmailSender;
use waitlist_api::http::server::{AppState, HttpServer};
use waitlist_api::lifecycle::Shutdown;
use waitlist_api::security::admission::AdmissionController;
use waitlist_api::storage::StorageClient;
use waitlist_api::waitlist::workflow::WaitlistService;

pub const OUTBOUND_TIMEOUT: Duration = Duration::from_secs(5);

/// Serve a router on an ephemeral port, returning its address.
pub async fn spawn_router(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Mock storage API speaking just enough PostgREST.
pub struct MockStorage {
    pub addr: SocketAddr,
    /// Emails accepted so far, in insert order.
    pub emails: Arc<Mutex<Vec<String>>>,
}

pub async fn spawn_mock_storage() -> MockStorage {
    let emails: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

    async fn insert(
        State(emails): State<Arc<Mutex<Vec<String>>>>,
        Json(rows): Json<Vec<serde_json::Value>>,
    ) -> Response {
        let row = &rows[0];
        let email = row["email"].as_str().unwrap_or_default().to_string();
        let created_at = row["created_at"].as_str().unwrap_or_default().to_string();

        let mut stored = emails.lock().unwrap();
        if stored.contains(&email) {
            return (
                StatusCode::CONFLICT,
                Json(serde_json::json!({
                    "code": "23505",
                    "message": "duplicate key value violates unique constraint \"waitlist_email_key\"",
                })),
            )
                .into_response();
        }
        stored.push(email.clone());

        (
            StatusCode::CREATED,
            Json(serde_json::json!([{ "email": email, "created_at": created_at }])),
        )
            .into_response()
    }

    let router = Router::new()
        .route("/rest/v1/waitlist", post(insert))
        .with_state(emails.clone());

    MockStorage {
        addr: spawn_router(router).await,
        emails,
    }
}

impl MockStorage {
    pub fn client(&self) -> StorageClient {
        StorageClient::new(
            StorageCredentials {
                url: format!("http://{}/", self.addr).parse().unwrap(),
                service_key: "test-service-key".to_string(),
            },
            reqwest::Client::new(),
            OUTBOUND_TIMEOUT,
        )
        .unwrap()
    }
}

/// Mock CAPTCHA verifier: the token "pass" verifies, anything else fails.
pub async fn spawn_mock_captcha() -> CaptchaVerifier {
    async fn verify(body: String) -> Json<serde_json::Value> {
        let passed = body
            .split('&')
            .any(|pair| pair == "response=pass");
        if passed {
            Json(serde_json::json!({ "success": true }))
        } else {
            Json(serde_json::json!({
                "success": false,
                "error-codes": ["invalid-input-response"],
            }))
        }
    }

    let addr = spawn_router(Router::new().route("/siteverify", post(verify))).await;
    CaptchaVerifier::live(
        "test-secret".to_string(),
        reqwest::Client::new(),
        OUTBOUND_TIMEOUT,
    )
    .with_verify_url(format!("http://{addr}/siteverify"))
}

/// Mock email provider with a switchable failure mode.
pub struct MockEmail {
    pub sender: EmailSender,
    pub sends: Arc<AtomicUsize>,
}

pub async fn spawn_mock_email(fail: bool) -> MockEmail {
    let sends: Arc<AtomicUsize> = Arc::new(AtomicUsize::new(0));

    #[derive(Clone)]
    struct MailState {
        sends: Arc<AtomicUsize>,
        fail: bool,
    }

    async fn send(State(state): State<MailState>) -> Response {
        state.sends.fetch_add(1, Ordering::SeqCst);
        if state.fail {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "errors": [{ "message": "provider exploded" }] })),
            )
                .into_response();
        }
        let mut response = StatusCode::ACCEPTED.into_response();
        response
            .headers_mut()
            .insert("x-message-id", "msg-123".parse().unwrap());
        response
    }

    let router = Router::new()
        .route("/v3/mail/send", post(send))
        .with_state(MailState {
            sends: sends.clone(),
            fail,
        });
    let addr = spawn_router(router).await;

    let sender = EmailSender::live(
        EmailCredentials {
            api_key: "test-api-key".to_string(),
            from: "hello@example.com".to_string(),
        },
        reqwest::Client::new(),
        OUTBOUND_TIMEOUT,
    )
    .with_api_url(format!("http://{addr}/v3/mail/send"));

    MockEmail { sender, sends }
}

/// Config with a tight waitlist policy and everything else default.
pub fn test_config(max_requests: u32, window_secs: u64) -> AppConfig {
    let mut config = AppConfig::default();
    config.rate_limit.endpoints.insert(
        "/api/waitlist".to_string(),
        RatePolicyConfig {
            max_requests,
            window_secs,
        },
    );
    config
}

/// The server under test.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    /// Held so the server and sweeper can be stopped from the test.
    #[allow(dead_code)]
    pub shutdown: Arc<Shutdown>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Wire the full server from explicit collaborators and start serving.
pub async fn spawn_app(
    config: AppConfig,
    storage: Option<StorageClient>,
    captcha: CaptchaVerifier,
    email: EmailSender,
    email_test_recipient: Option<String>,
) -> TestApp {
    let admission = Arc::new(AdmissionController::new(&config.rate_limit));
    let service = Arc::new(WaitlistService::new(
        admission.clone(),
        storage,
        captcha,
        email,
    ));
    let state = AppState {
        service,
        email_test_recipient,
    };

    let server = HttpServer::new(&config, admission, state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Arc::new(Shutdown::new());
    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = server.run(listener, &server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(150)).await;

    TestApp {
        addr,
        client: reqwest::Client::builder().no_proxy().build().unwrap(),
        shutdown,
    }
}
