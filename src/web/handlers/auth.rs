//! Authentication handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::auth::{
    generate_state, hash_password, normalize_email, validate_email, validate_password,
    verify_password, OAuthError,
};
use crate::db::{NewUser, PasswordResetRepository, User, UserRepository};
use crate::mail::{password_reset_email, reset_link};
use crate::web::dto::{
    ApiResponse, ForgotPasswordRequest, LoginRequest, MessageResponse, OAuthCallbackQuery,
    RegisterRequest, ResetPasswordRequest, UserProfile, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::{OptionalSessionUser, OAUTH_STATE_COOKIE};
use crate::AskarError;

/// Where failed OAuth logins land.
pub const FAILURE_PATH: &str = "/auth/failure";

/// Reply to every valid forgot-password request.
pub const RESET_REQUESTED_MESSAGE: &str =
    "If an account with that email exists, a reset link has been sent.";

/// Reply to a successful password reset.
pub const RESET_DONE_MESSAGE: &str = "Password reset successfully. You can now sign in.";

/// Reply to a missing, used or expired reset token.
pub const RESET_INVALID_MESSAGE: &str = "Invalid or expired reset link.";

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Sign `user` in: issue a session and add its cookie to `jar`.
fn start_session(state: &AppState, jar: CookieJar, user: &User) -> Result<CookieJar, ApiError> {
    let token = state
        .session
        .keys()
        .issue(user.id, &user.email, &user.name)?;
    Ok(jar.add(state.session.session_cookie(token)))
}

async fn record_login(state: &AppState, user: User) -> User {
    let repo = UserRepository::new(state.db.pool());
    if let Err(e) = repo.update_last_login(user.id).await {
        tracing::warn!(user_id = user.id, "Failed to record login: {}", e);
        return user;
    }
    match repo.get_by_id(user.id).await {
        Ok(Some(updated)) => updated,
        _ => user,
    }
}

/// POST /auth/register - Create an account and sign in.
pub async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(CookieJar, Json<ApiResponse<UserProfile>>), ApiError> {
    let email = normalize_email(&req.email);
    let repo = UserRepository::new(state.db.pool());

    if repo.get_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict("An account with that email already exists."));
    }

    let password_hash =
        hash_password(&req.password).map_err(|e| ApiError::unprocessable(e.to_string()))?;

    let new_user = NewUser::new(&email, req.name.trim()).with_password_hash(password_hash);
    let user = repo.create(&new_user).await.map_err(|e| match e {
        AskarError::Validation(_) => {
            ApiError::conflict("An account with that email already exists.")
        }
        other => other.into(),
    })?;

    tracing::info!(user_id = user.id, email = %user.email, "User registered");

    let user = record_login(&state, user).await;
    let jar = start_session(&state, jar, &user)?;
    Ok((jar, Json(ApiResponse::new(UserProfile::from(&user)))))
}

/// POST /auth/login - Password login.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<UserProfile>>), ApiError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let email = normalize_email(&req.email);
    let user = UserRepository::new(state.db.pool())
        .get_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))?;

    // OAuth-only accounts have no password to check
    let hash = user
        .password_hash
        .as_deref()
        .ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))?;
    verify_password(&req.password, hash).map_err(|_| {
        tracing::info!(email = %email, "Failed login attempt");
        ApiError::unauthorized(INVALID_CREDENTIALS)
    })?;

    if !user.is_active {
        return Err(ApiError::forbidden("Account is disabled"));
    }

    let user = record_login(&state, user).await;
    tracing::info!(user_id = user.id, "User logged in");

    let jar = start_session(&state, jar, &user)?;
    Ok((jar, Json(ApiResponse::new(UserProfile::from(&user)))))
}

/// GET /auth/logout - Clear the session and return to the frontend.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    OptionalSessionUser(claims): OptionalSessionUser,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    if let Some(claims) = claims {
        tracing::info!(user_id = claims.sub, "User logged out");
    }
    (
        jar.add(state.session.removal_cookie()),
        Redirect::to(&state.frontend_url),
    )
}

/// GET /auth/google - Redirect to the provider's consent page.
pub async fn google(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let oauth_state = generate_state();
    match state.identity.authorize_url(&oauth_state) {
        Ok(url) => (
            jar.add(state.session.oauth_state_cookie(oauth_state)),
            Redirect::to(&url),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!("Google login unavailable: {}", e);
            Redirect::to(FAILURE_PATH).into_response()
        }
    }
}

/// GET /auth/google/callback - Finish the OAuth login.
pub async fn google_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<OAuthCallbackQuery>,
) -> (CookieJar, Redirect) {
    let expected_state = jar.get(OAUTH_STATE_COOKIE).map(|c| c.value().to_string());
    let jar = jar.add(state.session.oauth_state_removal());

    match complete_oauth(&state, expected_state.as_deref(), &query).await {
        Ok(user) => match start_session(&state, jar.clone(), &user) {
            Ok(jar) => {
                tracing::info!(user_id = user.id, "User logged in with Google");
                (jar, Redirect::to(&state.frontend_url))
            }
            Err(e) => {
                tracing::error!("Failed to start session: {}", e);
                (jar, Redirect::to(FAILURE_PATH))
            }
        },
        Err(e) => {
            tracing::warn!("Google login failed: {}", e);
            (jar, Redirect::to(FAILURE_PATH))
        }
    }
}

async fn complete_oauth(
    state: &AppState,
    expected_state: Option<&str>,
    query: &OAuthCallbackQuery,
) -> Result<User, AskarError> {
    if let Some(error) = &query.error {
        return Err(AskarError::OAuth(format!("provider returned {error}")));
    }
    let code = query
        .code
        .as_deref()
        .ok_or_else(|| AskarError::OAuth("missing authorization code".to_string()))?;
    match (expected_state, query.state.as_deref()) {
        (Some(expected), Some(got)) if expected == got => {}
        _ => return Err(AskarError::OAuth("state mismatch".to_string())),
    }

    let identity = state
        .identity
        .exchange(code)
        .await
        .map_err(|e: OAuthError| AskarError::OAuth(e.to_string()))?;

    let user = UserRepository::new(state.db.pool())
        .upsert_google(&identity.subject, &identity.email, &identity.name)
        .await?;
    if !user.is_active {
        return Err(AskarError::Auth("account is disabled".to_string()));
    }

    Ok(record_login(state, user).await)
}

/// GET /auth/failure - Landing page for failed OAuth logins.
pub async fn failure() -> &'static str {
    "Login failed"
}

/// POST /auth/forgot-password - Email a reset link.
///
/// Answers the same way whether or not the account exists. Errors use the
/// API error envelope, so clients read the text from `error.message`.
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if validate_email(&req.email).is_err() {
        return Err(ApiError::unprocessable("Please enter a valid email address."));
    }

    let email = normalize_email(&req.email);
    let user = UserRepository::new(state.db.pool())
        .get_by_email(&email)
        .await?;

    match user {
        Some(user) if user.is_active => {
            let tokens = PasswordResetRepository::new(state.db.pool());
            tokens.revoke_all_for_user(user.id).await?;
            let token = tokens.issue(user.id, state.reset_token_ttl_secs).await?;

            let link = reset_link(&state.frontend_url, &token);
            let message =
                password_reset_email(&user.email, &link, state.reset_token_ttl_secs / 60);
            if let Err(e) = state.mailer.send(&message).await {
                tracing::error!(user_id = user.id, "Failed to send reset email: {}", e);
                return Err(ApiError::internal(
                    "Could not send the reset email. Please try again later.",
                ));
            }
            tracing::info!(user_id = user.id, "Password reset email sent");
        }
        _ => {
            tracing::debug!(email = %email, "Password reset requested for unknown account");
        }
    }

    Ok(Json(ApiResponse::new(MessageResponse::new(
        RESET_REQUESTED_MESSAGE,
    ))))
}

/// POST /auth/reset-password - Set a new password with an emailed token.
///
/// Replies in plain text.
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetPasswordRequest>,
) -> (StatusCode, String) {
    match apply_reset(&state, &req).await {
        Ok(()) => (StatusCode::OK, RESET_DONE_MESSAGE.to_string()),
        Err(AskarError::Validation(msg)) => (StatusCode::BAD_REQUEST, msg),
        Err(e) => {
            tracing::error!("Password reset failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong. Please try again.".to_string(),
            )
        }
    }
}

async fn apply_reset(state: &AppState, req: &ResetPasswordRequest) -> Result<(), AskarError> {
    let token = req.token.trim();
    if token.is_empty() {
        return Err(AskarError::Validation(RESET_INVALID_MESSAGE.to_string()));
    }
    // Check strength before spending the token
    validate_password(&req.new_password).map_err(|e| AskarError::Validation(e.to_string()))?;

    let tokens = PasswordResetRepository::new(state.db.pool());
    let consumed = tokens
        .consume(token)
        .await?
        .ok_or_else(|| AskarError::Validation(RESET_INVALID_MESSAGE.to_string()))?;

    let hash = hash_password(&req.new_password).map_err(|e| AskarError::Auth(e.to_string()))?;
    let updated = UserRepository::new(state.db.pool())
        .update_password(consumed.user_id, &hash)
        .await?;
    if !updated {
        return Err(AskarError::Validation(RESET_INVALID_MESSAGE.to_string()));
    }
    tokens.revoke_all_for_user(consumed.user_id).await?;

    tracing::info!(user_id = consumed.user_id, "Password reset");
    Ok(())
}
