//! Request DTOs.

use serde::Deserialize;
use validator::Validate;

use super::validation::{strong_password, valid_email, valid_name};
use crate::drive::{
    FilterConfig, KindMode, PeopleMode, RecencyWindow, SortDirection, SortKey, SortState,
    SourceScope, TypeLabel,
};
use crate::web::error::ApiError;

/// Registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(custom(function = "valid_email"))]
    pub email: String,
    #[validate(custom(function = "strong_password"))]
    pub password: String,
    #[validate(custom(function = "valid_name"))]
    pub name: String,
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Forgot-password request.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

/// Reset-password request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub new_password: String,
}

/// Query string of the OAuth callback.
#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Filter settings in the file listing query string.
///
/// Every field is optional; an empty value means "unset".
#[derive(Debug, Default, Deserialize)]
pub struct FileListQuery {
    pub kind: Option<String>,
    #[serde(rename = "type")]
    pub type_label: Option<String>,
    pub people: Option<String>,
    pub modified: Option<String>,
    pub source: Option<String>,
}

impl FileListQuery {
    /// Convert to pipeline settings.
    ///
    /// Unknown values for kind, type, people and modified are rejected.
    /// Unknown source names behave like "anywhere".
    pub fn to_config(&self) -> Result<FilterConfig, ApiError> {
        Ok(FilterConfig {
            kind: parse_opt::<KindMode>(&self.kind)?.unwrap_or_default(),
            type_label: parse_opt::<TypeLabel>(&self.type_label)?,
            people: parse_opt::<PeopleMode>(&self.people)?,
            modified: parse_opt::<RecencyWindow>(&self.modified)?,
            source: non_empty(&self.source).map(SourceScope::from_name_lenient),
        })
    }
}

/// Sort settings of a page request.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub sort: Option<String>,
    pub dir: Option<String>,
}

impl PageQuery {
    /// Convert to a sort state; missing values use name ascending.
    pub fn to_sort(&self) -> Result<SortState, ApiError> {
        Ok(SortState::new(
            parse_opt::<SortKey>(&self.sort)?.unwrap_or_default(),
            parse_opt::<SortDirection>(&self.dir)?.unwrap_or_default(),
        ))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_opt<T>(value: &Option<String>) -> Result<Option<T>, ApiError>
where
    T: std::str::FromStr<Err = String>,
{
    non_empty(value)
        .map(|v| v.parse::<T>().map_err(ApiError::bad_request))
        .transpose()
}
