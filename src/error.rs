//! Error types for askar.

use thiserror::Error;

/// Common error type for askar.
#[derive(Error, Debug)]
pub enum AskarError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Outgoing mail could not be built or delivered.
    #[error("mail error: {0}")]
    Mail(String),

    /// The OAuth provider rejected or failed a request.
    #[error("OAuth error: {0}")]
    OAuth(String),
}

impl From<sqlx::Error> for AskarError {
    fn from(e: sqlx::Error) -> Self {
        AskarError::Database(e.to_string())
    }
}

impl From<crate::drive::StoreError> for AskarError {
    fn from(e: crate::drive::StoreError) -> Self {
        AskarError::Validation(e.to_string())
    }
}

/// Result type alias for askar operations.
pub type Result<T> = std::result::Result<T, AskarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_display() {
        let err = AskarError::Auth("invalid password".to_string());
        assert_eq!(err.to_string(), "authentication error: invalid password");
    }

    #[test]
    fn test_validation_error_display() {
        let err = AskarError::Validation("email too long".to_string());
        assert_eq!(err.to_string(), "validation error: email too long");
    }

    #[test]
    fn test_not_found_error_display() {
        let err = AskarError::NotFound("user".to_string());
        assert_eq!(err.to_string(), "user not found");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "seed file missing");
        let err: AskarError = io_err.into();
        assert!(matches!(err, AskarError::Io(_)));
        assert!(err.to_string().contains("seed file missing"));
    }

    #[test]
    fn test_store_error_becomes_validation() {
        let err: AskarError = crate::drive::StoreError::DuplicateId(7).into();
        assert!(matches!(err, AskarError::Validation(_)));
        assert!(err.to_string().contains('7'));
    }

    #[test]
    fn test_mail_error_display() {
        let err = AskarError::Mail("relay refused".to_string());
        assert_eq!(err.to_string(), "mail error: relay refused");
    }
}
