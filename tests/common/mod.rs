//! Shared helpers for the HTTP integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use askar::auth::{ExternalIdentity, IdentityProvider, OAuthError, SessionKeys};
use askar::config::ServerConfig;
use askar::drive::{EntityStore, FileRecord};
use askar::mail::MemoryMailer;
use askar::web::handlers::AppState;
use askar::web::middleware::SessionState;
use askar::{Database, WebServer};
use axum::async_trait;
use axum_extra::extract::cookie::Cookie;
use axum_test::{TestResponse, TestServer};
use serde_json::{json, Value};
use tokio::sync::RwLock;

pub const SESSION_COOKIE: &str = "askar_session";
pub const FRONTEND_URL: &str = "http://localhost:5173";
pub const STRONG_PASSWORD: &str = "Drive#2025";

/// Identity provider that accepts the code "good-code".
pub struct StubProvider;

#[async_trait]
impl IdentityProvider for StubProvider {
    fn authorize_url(&self, state: &str) -> Result<String, OAuthError> {
        Ok(format!(
            "https://accounts.example.test/auth?scope=profile%20email&state={state}"
        ))
    }

    async fn exchange(&self, code: &str) -> Result<ExternalIdentity, OAuthError> {
        if code == "good-code" {
            Ok(ExternalIdentity {
                subject: "google-sub-1".to_string(),
                email: "hadi@example.com".to_string(),
                name: "Hadi".to_string(),
            })
        } else {
            Err(OAuthError::Exchange("invalid_grant".to_string()))
        }
    }
}

/// A running test app and its collaborators.
pub struct TestApp {
    pub server: TestServer,
    pub db: Database,
    pub mailer: Arc<MemoryMailer>,
    pub store: Arc<RwLock<EntityStore>>,
}

pub struct TestAppBuilder {
    records: Vec<FileRecord>,
    mailer: MemoryMailer,
    auth_rate_limit: u32,
}

impl TestAppBuilder {
    pub fn records(mut self, records: Vec<FileRecord>) -> Self {
        self.records = records;
        self
    }

    pub fn failing_mailer(mut self) -> Self {
        self.mailer = MemoryMailer::failing();
        self
    }

    pub fn auth_rate_limit(mut self, limit: u32) -> Self {
        self.auth_rate_limit = limit;
        self
    }

    pub async fn build(self) -> TestApp {
        let db = Database::open_in_memory()
            .await
            .expect("Failed to create test database");
        let store = Arc::new(RwLock::new(
            EntityStore::with_records(self.records).expect("Invalid test records"),
        ));
        let mailer = Arc::new(self.mailer);
        let session = SessionState::new(
            SessionKeys::new("test-secret-key-for-testing-only", 3600),
            SESSION_COOKIE,
            false,
        );

        let app_state = AppState::new(
            db.clone(),
            store.clone(),
            Arc::new(session),
            Arc::new(StubProvider),
            mailer.clone(),
            FRONTEND_URL,
            3600,
            chrono_tz::UTC,
        );

        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            auth_rate_limit: self.auth_rate_limit,
            ..ServerConfig::default()
        };
        let router = WebServer::new(&config, app_state)
            .expect("Failed to create web server")
            .router();
        let server = TestServer::new(router).expect("Failed to create test server");

        TestApp {
            server,
            db,
            mailer,
            store,
        }
    }
}

impl TestApp {
    pub fn builder() -> TestAppBuilder {
        TestAppBuilder {
            records: Vec::new(),
            mailer: MemoryMailer::new(),
            auth_rate_limit: 1000,
        }
    }

    pub async fn new() -> Self {
        Self::builder().build().await
    }

    /// Register an account and return the response.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> TestResponse {
        self.server
            .post("/auth/register")
            .json(&json!({ "email": email, "password": password, "name": name }))
            .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.server
            .post("/auth/login")
            .json(&json!({ "email": email, "password": password }))
            .await
    }

    /// Register `email` and return its session cookie.
    pub async fn session_for(&self, email: &str) -> Cookie<'static> {
        let response = self.register(email, STRONG_PASSWORD, "Test User").await;
        response.assert_status_ok();
        response.cookie(SESSION_COOKIE)
    }
}

/// Reset token from the link in the last email sent.
pub async fn last_reset_token(mailer: &MemoryMailer) -> String {
    let sent = mailer.sent().await;
    let email = sent.last().expect("no email sent");
    let start = email
        .text
        .find("/reset-password/")
        .expect("no reset link in email")
        + "/reset-password/".len();
    email.text[start..]
        .split_whitespace()
        .next()
        .expect("empty token")
        .to_string()
}

/// Ids of the records in a `files` array.
pub fn file_ids(body: &Value, pointer: &str) -> Vec<i64> {
    body.pointer(pointer)
        .and_then(Value::as_array)
        .expect("files array")
        .iter()
        .map(|f| f["id"].as_i64().expect("id"))
        .collect()
}
