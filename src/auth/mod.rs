//! Authentication: password hashing, input validation, session tokens and
//! the OAuth identity provider.

pub mod oauth;
pub mod password;
pub mod session;
pub mod validation;

pub use oauth::{
    generate_state, ExternalIdentity, GoogleProvider, IdentityProvider, OAuthError, OAUTH_SCOPES,
};
pub use password::{
    hash_password, validate_password, verify_password, PasswordError, MAX_PASSWORD_LENGTH,
    MIN_PASSWORD_LENGTH, PASSWORD_SYMBOLS,
};
pub use session::{SessionClaims, SessionError, SessionKeys};
pub use validation::{
    normalize_email, validate_email, validate_name, ValidationError, MAX_EMAIL_LENGTH,
    MAX_NAME_LENGTH,
};
