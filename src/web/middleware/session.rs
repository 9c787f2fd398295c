//! Cookie session middleware and extractors.

use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{request::Parts, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

use crate::auth::{SessionClaims, SessionKeys};
use crate::web::error::ApiError;

/// Cookie carrying the OAuth `state` between the redirect and the callback.
pub const OAUTH_STATE_COOKIE: &str = "askar_oauth_state";

/// Session settings shared by the extractors and the auth handlers.
#[derive(Debug, Clone)]
pub struct SessionState {
    keys: SessionKeys,
    cookie_name: String,
    secure: bool,
}

impl SessionState {
    /// Create a new session state.
    pub fn new(keys: SessionKeys, cookie_name: impl Into<String>, secure: bool) -> Self {
        Self {
            keys,
            cookie_name: cookie_name.into(),
            secure,
        }
    }

    /// Signing keys.
    pub fn keys(&self) -> &SessionKeys {
        &self.keys
    }

    /// Name of the session cookie.
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Session cookie holding `token`.
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        self.cookie(self.cookie_name.clone(), token)
    }

    /// Cookie that clears the session.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = self.cookie(self.cookie_name.clone(), String::new());
        cookie.make_removal();
        cookie
    }

    /// Cookie holding the OAuth `state`.
    pub fn oauth_state_cookie(&self, state: String) -> Cookie<'static> {
        self.cookie(OAUTH_STATE_COOKIE.to_string(), state)
    }

    /// Cookie that clears the OAuth `state`.
    pub fn oauth_state_removal(&self) -> Cookie<'static> {
        let mut cookie = self.cookie(OAUTH_STATE_COOKIE.to_string(), String::new());
        cookie.make_removal();
        cookie
    }

    /// Claims of the session in `jar`, if any.
    pub fn claims_from(&self, jar: &CookieJar) -> Option<SessionClaims> {
        let cookie = jar.get(&self.cookie_name)?;
        self.keys.verify(cookie.value()).ok()
    }

    fn cookie(&self, name: String, value: String) -> Cookie<'static> {
        Cookie::build((name, value))
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .path("/")
            .build()
    }
}

/// Extractor for signed-in users.
///
/// Rejects with 401 when the session cookie is missing, tampered with, or
/// expired.
#[derive(Debug, Clone)]
pub struct SessionUser(pub SessionClaims);

impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let session = parts
                .extensions
                .get::<Arc<SessionState>>()
                .ok_or_else(|| ApiError::internal("Session state not configured"))?;

            let jar = CookieJar::from_headers(&parts.headers);
            session
                .claims_from(&jar)
                .map(SessionUser)
                .ok_or_else(|| ApiError::unauthorized("Not authenticated"))
        })
    }
}

/// Optional session extractor.
///
/// Like [`SessionUser`] but yields `None` instead of rejecting.
#[derive(Debug, Clone)]
pub struct OptionalSessionUser(pub Option<SessionClaims>);

impl<S> FromRequestParts<S> for OptionalSessionUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let claims = match parts.extensions.get::<Arc<SessionState>>() {
                Some(session) => session.claims_from(&CookieJar::from_headers(&parts.headers)),
                None => None,
            };
            Ok(OptionalSessionUser(claims))
        })
    }
}

/// Middleware function to inject the session state into request extensions.
pub async fn session_layer(
    session: Arc<SessionState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(session);
    next.run(request).await
}
