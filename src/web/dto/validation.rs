//! Validation utilities for request DTOs.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::auth;
use crate::web::error::ApiError;

/// A JSON extractor that validates the request body.
///
/// Deserializes the body, then runs the `validator` rules. Failures become a
/// 422 with field-level details.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e)))?;

        value.validate().map_err(ApiError::from_validation_errors)?;

        Ok(ValidatedJson(value))
    }
}

/// Email field rule.
pub fn valid_email(value: &str) -> Result<(), validator::ValidationError> {
    auth::validate_email(value).map_err(|_| {
        validator::ValidationError::new("email")
            .with_message("Please enter a valid email address.".into())
    })
}

/// Strong password rule.
pub fn strong_password(value: &str) -> Result<(), validator::ValidationError> {
    auth::validate_password(value).map_err(|e| {
        validator::ValidationError::new("password").with_message(e.to_string().into())
    })
}

/// Display name rule.
pub fn valid_name(value: &str) -> Result<(), validator::ValidationError> {
    auth::validate_name(value).map_err(|e| {
        validator::ValidationError::new("name").with_message(e.to_string().into())
    })
}
