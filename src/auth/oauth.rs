//! Google OAuth 2.0 login.
//!
//! The web layer only talks to [`IdentityProvider`]; [`GoogleProvider`] is the
//! production implementation over `reqwest`.

use axum::async_trait;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::OAuthConfig;

/// Scopes requested from the provider.
pub const OAUTH_SCOPES: &str = "profile email";

/// OAuth errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OAuthError {
    /// Client credentials are not configured.
    #[error("OAuth login is not configured")]
    Disabled,

    /// A configured endpoint URL is malformed.
    #[error("invalid OAuth endpoint: {0}")]
    InvalidEndpoint(String),

    /// The authorization code exchange failed.
    #[error("token exchange failed: {0}")]
    Exchange(String),

    /// The user info request failed.
    #[error("failed to fetch profile: {0}")]
    Profile(String),

    /// The provider did not return an email address.
    #[error("provider returned no email address")]
    MissingEmail,
}

/// Identity returned by the provider after a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    /// Provider-scoped subject id.
    pub subject: String,
    /// Account email, lower-cased.
    pub email: String,
    /// Display name; falls back to the email.
    pub name: String,
}

/// An OAuth identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL of the consent page, carrying `state`.
    fn authorize_url(&self, state: &str) -> Result<String, OAuthError>;

    /// Exchange an authorization code for the user's identity.
    async fn exchange(&self, code: &str) -> Result<ExternalIdentity, OAuthError>;
}

/// Random value for the `state` parameter.
pub fn generate_state() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Google as an [`IdentityProvider`].
pub struct GoogleProvider {
    config: OAuthConfig,
    client: reqwest::Client,
}

impl GoogleProvider {
    /// Create a provider from configuration.
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn authorize_url(&self, state: &str) -> Result<String, OAuthError> {
        if !self.config.is_enabled() {
            return Err(OAuthError::Disabled);
        }
        let mut url = Url::parse(&self.config.auth_url)
            .map_err(|e| OAuthError::InvalidEndpoint(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_url)
            .append_pair("response_type", "code")
            .append_pair("scope", OAUTH_SCOPES)
            .append_pair("state", state);
        Ok(url.into())
    }

    async fn exchange(&self, code: &str) -> Result<ExternalIdentity, OAuthError> {
        if !self.config.is_enabled() {
            return Err(OAuthError::Disabled);
        }

        let token: TokenResponse = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.redirect_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| OAuthError::Exchange(e.to_string()))?
            .json()
            .await
            .map_err(|e| OAuthError::Exchange(e.to_string()))?;

        let info: UserInfo = self
            .client
            .get(&self.config.userinfo_url)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| OAuthError::Profile(e.to_string()))?
            .json()
            .await
            .map_err(|e| OAuthError::Profile(e.to_string()))?;

        identity_from_userinfo(info)
    }
}

fn identity_from_userinfo(info: UserInfo) -> Result<ExternalIdentity, OAuthError> {
    let email = info
        .email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .ok_or(OAuthError::MissingEmail)?;
    let name = info
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| email.clone());

    Ok(ExternalIdentity {
        subject: info.sub,
        email,
        name,
    })
}
