//! Signed session tokens.
//!
//! A session is an HS256 JWT carried in an HttpOnly cookie. The token holds
//! enough of the profile to serve `/user/profile` without a database hit.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Session errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The token could not be signed.
    #[error("failed to sign session: {0}")]
    Encode(String),

    /// The token is malformed, tampered with, or expired.
    #[error("invalid or expired session")]
    Invalid,
}

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID).
    pub sub: i64,
    /// Account email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Issued at timestamp.
    pub iat: u64,
    /// Expiration timestamp.
    pub exp: u64,
    /// Token ID.
    pub jti: String,
}

/// Keys and lifetime for issuing and checking sessions.
#[derive(Clone)]
pub struct SessionKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry_secs: u64,
}

impl SessionKeys {
    /// Create keys from a shared secret.
    pub fn new(secret: &str, expiry_secs: u64) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiry_secs,
        }
    }

    /// Session lifetime in seconds.
    pub fn expiry_secs(&self) -> u64 {
        self.expiry_secs
    }

    /// Issue a session token for a user.
    pub fn issue(&self, user_id: i64, email: &str, name: &str) -> Result<String, SessionError> {
        let now = Utc::now().timestamp().max(0) as u64;
        let claims = SessionClaims {
            sub: user_id,
            email: email.to_string(),
            name: name.to_string(),
            iat: now,
            exp: now + self.expiry_secs,
            jti: uuid::Uuid::new_v4().to_string(),
        };
        self.sign(&claims)
    }

    /// Sign arbitrary claims.
    pub fn sign(&self, claims: &SessionClaims) -> Result<String, SessionError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| SessionError::Encode(e.to_string()))
    }

    /// Verify a token and return its claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Session validation failed: {}", e);
                SessionError::Invalid
            })
    }
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("expiry_secs", &self.expiry_secs)
            .finish_non_exhaustive()
    }
}
