//! Web API Authentication Tests
//!
//! Integration tests for registration, login, sessions, Google login and the
//! password reset flow.

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use askar::db::{NewUser, UserRepository};
use common::{last_reset_token, TestApp, FRONTEND_URL, SESSION_COOKIE, STRONG_PASSWORD};

// ============================================================================
// Registration Tests
// ============================================================================

#[tokio::test]
async fn test_register_success() {
    let app = TestApp::new().await;

    let response = app
        .register("Lina@Example.com", STRONG_PASSWORD, "Lina")
        .await;

    response.assert_status_ok();
    let cookie = response.cookie(SESSION_COOKIE);
    assert!(!cookie.value().is_empty());
    assert_eq!(cookie.http_only(), Some(true));

    let body: Value = response.json();
    assert_eq!(body["data"]["email"], "lina@example.com");
    assert_eq!(body["data"]["name"], "Lina");
    assert_eq!(body["data"]["hasPassword"], true);
    assert!(body["data"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_register_then_profile() {
    let app = TestApp::new().await;
    let cookie = app.session_for("lina@example.com").await;

    let response = app.server.get("/user/profile").add_cookie(cookie).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["email"], "lina@example.com");
    assert!(body["data"]["lastLogin"].is_string());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::new().await;
    app.register("lina@example.com", STRONG_PASSWORD, "Lina")
        .await
        .assert_status_ok();

    let response = app
        .register("LINA@example.com", STRONG_PASSWORD, "Other")
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_register_weak_password() {
    let app = TestApp::new().await;

    let response = app.register("lina@example.com", "password", "Lina").await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["details"]["password"].is_array());
}

#[tokio::test]
async fn test_register_invalid_email() {
    let app = TestApp::new().await;

    let response = app.register("not-an-email", STRONG_PASSWORD, "Lina").await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(
        body["error"]["details"]["email"][0],
        "Please enter a valid email address."
    );
}

#[tokio::test]
async fn test_register_missing_field() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/auth/register")
        .json(&json!({ "email": "lina@example.com", "password": STRONG_PASSWORD }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

// ============================================================================
// Login Tests
// ============================================================================

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new().await;
    app.register("lina@example.com", STRONG_PASSWORD, "Lina")
        .await
        .assert_status_ok();

    let response = app.login("LINA@example.com", STRONG_PASSWORD).await;

    response.assert_status_ok();
    assert!(!response.cookie(SESSION_COOKIE).value().is_empty());
    let body: Value = response.json();
    assert_eq!(body["data"]["email"], "lina@example.com");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::new().await;
    app.register("lina@example.com", STRONG_PASSWORD, "Lina")
        .await
        .assert_status_ok();

    let response = app.login("lina@example.com", "Wrong#2025").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_login_unknown_email() {
    let app = TestApp::new().await;

    let response = app.login("nobody@example.com", STRONG_PASSWORD).await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_empty_fields() {
    let app = TestApp::new().await;

    let response = app.login("", "").await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_disabled_account() {
    let app = TestApp::new().await;
    let response = app.register("lina@example.com", STRONG_PASSWORD, "Lina").await;
    let id = response.json::<Value>()["data"]["id"].as_i64().unwrap();
    UserRepository::new(app.db.pool())
        .set_active(id, false)
        .await
        .unwrap();

    let response = app.login("lina@example.com", STRONG_PASSWORD).await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_login_oauth_only_account() {
    let app = TestApp::new().await;
    UserRepository::new(app.db.pool())
        .create(&NewUser::new("hadi@example.com", "Hadi").with_google_id("google-sub-1"))
        .await
        .unwrap();

    let response = app.login("hadi@example.com", STRONG_PASSWORD).await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_rate_limited() {
    let app = TestApp::builder().auth_rate_limit(2).build().await;

    app.login("a@example.com", STRONG_PASSWORD)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    app.login("a@example.com", STRONG_PASSWORD)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let response = app.login("a@example.com", STRONG_PASSWORD).await;
    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "TOO_MANY_REQUESTS");
}

// ============================================================================
// Session Tests
// ============================================================================

#[tokio::test]
async fn test_profile_requires_session() {
    let app = TestApp::new().await;

    let response = app.server.get("/user/profile").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_rejects_forged_cookie() {
    let app = TestApp::new().await;

    let response = app
        .server
        .get("/user/profile")
        .add_cookie(axum_extra::extract::cookie::Cookie::new(
            SESSION_COOKIE,
            "eyJhbGciOiJIUzI1NiJ9.e30.forged",
        ))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_clears_cookie_and_redirects() {
    let app = TestApp::new().await;
    let cookie = app.session_for("lina@example.com").await;

    let response = app.server.get("/auth/logout").add_cookie(cookie).await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), FRONTEND_URL);
    assert_eq!(response.cookie(SESSION_COOKIE).value(), "");
}

// ============================================================================
// Google Login Tests
// ============================================================================

#[tokio::test]
async fn test_google_redirects_with_state() {
    let app = TestApp::new().await;

    let response = app.server.get("/auth/google").await;

    response.assert_status(StatusCode::SEE_OTHER);
    let location = response.header("location");
    let location = location.to_str().unwrap();
    let state = response.cookie("askar_oauth_state");
    assert!(location.contains("scope=profile%20email"));
    assert!(location.ends_with(&format!("state={}", state.value())));
}

#[tokio::test]
async fn test_google_callback_signs_in() {
    let app = TestApp::new().await;
    let state = app.server.get("/auth/google").await.cookie("askar_oauth_state");
    let state_value = state.value().to_string();

    let response = app
        .server
        .get("/auth/google/callback")
        .add_query_param("code", "good-code")
        .add_query_param("state", &state_value)
        .add_cookie(state)
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), FRONTEND_URL);
    let session = response.cookie(SESSION_COOKIE);

    let profile = app.server.get("/user/profile").add_cookie(session).await;
    profile.assert_status_ok();
    let body: Value = profile.json();
    assert_eq!(body["data"]["email"], "hadi@example.com");
    assert_eq!(body["data"]["googleLinked"], true);
    assert_eq!(body["data"]["hasPassword"], false);
}

#[tokio::test]
async fn test_google_callback_links_existing_account() {
    let app = TestApp::new().await;
    app.register("hadi@example.com", STRONG_PASSWORD, "Hadi")
        .await
        .assert_status_ok();
    let state = app.server.get("/auth/google").await.cookie("askar_oauth_state");
    let state_value = state.value().to_string();

    app.server
        .get("/auth/google/callback")
        .add_query_param("code", "good-code")
        .add_query_param("state", &state_value)
        .add_cookie(state)
        .await
        .assert_status(StatusCode::SEE_OTHER);

    let repo = UserRepository::new(app.db.pool());
    assert_eq!(repo.count().await.unwrap(), 1);
    let user = repo.get_by_email("hadi@example.com").await.unwrap().unwrap();
    assert_eq!(user.google_id.as_deref(), Some("google-sub-1"));
    assert!(user.has_password());
}

#[tokio::test]
async fn test_google_callback_state_mismatch() {
    let app = TestApp::new().await;
    let state = app.server.get("/auth/google").await.cookie("askar_oauth_state");

    let response = app
        .server
        .get("/auth/google/callback")
        .add_query_param("code", "good-code")
        .add_query_param("state", "forged-state")
        .add_cookie(state)
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/auth/failure");
    assert_eq!(UserRepository::new(app.db.pool()).count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_google_callback_exchange_failure() {
    let app = TestApp::new().await;
    let state = app.server.get("/auth/google").await.cookie("askar_oauth_state");
    let state_value = state.value().to_string();

    let response = app
        .server
        .get("/auth/google/callback")
        .add_query_param("code", "expired-code")
        .add_query_param("state", &state_value)
        .add_cookie(state)
        .await;

    assert_eq!(response.header("location"), "/auth/failure");
}

#[tokio::test]
async fn test_failure_page() {
    let app = TestApp::new().await;

    let response = app.server.get("/auth/failure").await;

    response.assert_status_ok();
    response.assert_text("Login failed");
}

// ============================================================================
// Password Reset Tests
// ============================================================================

const GENERIC_RESET_MESSAGE: &str =
    "If an account with that email exists, a reset link has been sent.";

#[tokio::test]
async fn test_forgot_password_unknown_email() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/auth/forgot-password")
        .json(&json!({ "email": "nobody@example.com" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["message"], GENERIC_RESET_MESSAGE);
    assert!(app.mailer.sent().await.is_empty());
}

#[tokio::test]
async fn test_forgot_password_invalid_email() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/auth/forgot-password")
        .json(&json!({ "email": "nope" }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["error"]["message"], "Please enter a valid email address.");
}

#[tokio::test]
async fn test_forgot_password_sends_link() {
    let app = TestApp::new().await;
    app.register("lina@example.com", STRONG_PASSWORD, "Lina")
        .await
        .assert_status_ok();

    let response = app
        .server
        .post("/auth/forgot-password")
        .json(&json!({ "email": "Lina@Example.com" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["message"], GENERIC_RESET_MESSAGE);

    let sent = app.mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "lina@example.com");
    assert!(sent[0]
        .text
        .contains(&format!("{FRONTEND_URL}/reset-password/")));
}

#[tokio::test]
async fn test_forgot_password_mail_failure() {
    let app = TestApp::builder().failing_mailer().build().await;
    app.register("lina@example.com", STRONG_PASSWORD, "Lina")
        .await
        .assert_status_ok();

    let response = app
        .server
        .post("/auth/forgot-password")
        .json(&json!({ "email": "lina@example.com" }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
}

#[tokio::test]
async fn test_reset_password_flow() {
    let app = TestApp::new().await;
    app.register("lina@example.com", STRONG_PASSWORD, "Lina")
        .await
        .assert_status_ok();
    app.server
        .post("/auth/forgot-password")
        .json(&json!({ "email": "lina@example.com" }))
        .await
        .assert_status_ok();
    let token = last_reset_token(&app.mailer).await;

    let response = app
        .server
        .post("/auth/reset-password")
        .json(&json!({ "token": token, "newPassword": "Fresh!Pass9" }))
        .await;

    response.assert_status_ok();
    response.assert_text("Password reset successfully. You can now sign in.");

    app.login("lina@example.com", STRONG_PASSWORD)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    app.login("lina@example.com", "Fresh!Pass9")
        .await
        .assert_status_ok();

    // The token is single use
    let reuse = app
        .server
        .post("/auth/reset-password")
        .json(&json!({ "token": token, "newPassword": "Another!Pass9" }))
        .await;
    reuse.assert_status(StatusCode::BAD_REQUEST);
    reuse.assert_text("Invalid or expired reset link.");
}

#[tokio::test]
async fn test_reset_password_weak_password_keeps_token() {
    let app = TestApp::new().await;
    app.register("lina@example.com", STRONG_PASSWORD, "Lina")
        .await
        .assert_status_ok();
    app.server
        .post("/auth/forgot-password")
        .json(&json!({ "email": "lina@example.com" }))
        .await
        .assert_status_ok();
    let token = last_reset_token(&app.mailer).await;

    let weak = app
        .server
        .post("/auth/reset-password")
        .json(&json!({ "token": token, "newPassword": "weak" }))
        .await;
    weak.assert_status(StatusCode::BAD_REQUEST);

    app.server
        .post("/auth/reset-password")
        .json(&json!({ "token": token, "newPassword": "Fresh!Pass9" }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_reset_password_unknown_token() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/auth/reset-password")
        .json(&json!({ "token": "0123456789abcdef", "newPassword": "Fresh!Pass9" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_text("Invalid or expired reset link.");
}

#[tokio::test]
async fn test_newer_reset_link_replaces_older() {
    let app = TestApp::new().await;
    app.register("lina@example.com", STRONG_PASSWORD, "Lina")
        .await
        .assert_status_ok();

    for _ in 0..2 {
        app.server
            .post("/auth/forgot-password")
            .json(&json!({ "email": "lina@example.com" }))
            .await
            .assert_status_ok();
    }
    let sent = app.mailer.sent().await;
    assert_eq!(sent.len(), 2);
    let first_link = &sent[0].text;
    let start = first_link.find("/reset-password/").unwrap() + "/reset-password/".len();
    let first_token = first_link[start..].split_whitespace().next().unwrap();

    app.server
        .post("/auth/reset-password")
        .json(&json!({ "token": first_token, "newPassword": "Fresh!Pass9" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let latest = last_reset_token(&app.mailer).await;
    app.server
        .post("/auth/reset-password")
        .json(&json!({ "token": latest, "newPassword": "Fresh!Pass9" }))
        .await
        .assert_status_ok();
}

// ============================================================================
// Misc
// ============================================================================

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    response.assert_text("OK");
}

#[tokio::test]
async fn test_security_headers_present() {
    let app = TestApp::new().await;

    let response = app.server.get("/auth/failure").await;

    assert_eq!(response.header("x-content-type-options"), "nosniff");
    assert_eq!(response.header("x-frame-options"), "DENY");
}
