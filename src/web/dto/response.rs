//! Response DTOs for the HTTP surface.

use serde::Serialize;

use crate::db::User;
use crate::drive::{FileId, FileRecord, FilterConfig, PageView, SortState};

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Message-only response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Account profile returned after login and by `/user/profile`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub name: String,
    /// Whether the account can sign in with a password.
    pub has_password: bool,
    /// Whether a Google account is linked.
    pub google_linked: bool,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            has_password: user.has_password(),
            google_linked: user.google_id.is_some(),
            created_at: crate::datetime::to_rfc3339(&user.created_at),
            last_login: user.last_login.as_deref().map(crate::datetime::to_rfc3339),
        }
    }
}

/// Working set of the file listing.
#[derive(Debug, Serialize)]
pub struct FileListResponse {
    pub files: Vec<FileRecord>,
    /// True until the store has been seeded.
    pub loading: bool,
    /// Filters the listing was derived with.
    pub filters: FilterConfig,
}

/// A sorted page view.
#[derive(Debug, Serialize)]
pub struct PageResponse {
    pub page: PageView,
    pub title: &'static str,
    pub sort: SortState,
    pub files: Vec<FileRecord>,
}

/// Outcome of a mutator.
#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub id: FileId,
    /// False when the id was unknown and nothing changed.
    pub changed: bool,
    /// The record after the change; absent when it no longer exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<FileRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: 3,
            email: "lina@example.com".to_string(),
            name: "Lina".to_string(),
            password_hash: Some("$argon2id$...".to_string()),
            google_id: None,
            created_at: "2025-01-02 03:04:05".to_string(),
            last_login: None,
            is_active: true,
        }
    }

    #[test]
    fn test_profile_from_user() {
        let profile = UserProfile::from(&user());
        let json = serde_json::to_value(&profile).unwrap();

        assert_eq!(json["id"], 3);
        assert_eq!(json["email"], "lina@example.com");
        assert_eq!(json["hasPassword"], true);
        assert_eq!(json["googleLinked"], false);
        assert_eq!(json["createdAt"], "2025-01-02T03:04:05Z");
        assert!(json.get("lastLogin").is_none());
        assert!(json.get("passwordHash").is_none());
    }

    #[test]
    fn test_mutation_response_omits_missing_file() {
        let json = serde_json::to_value(MutationResponse {
            id: 9,
            changed: false,
            file: None,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"id": 9, "changed": false}));
    }

    #[test]
    fn test_api_response_wraps_data() {
        let json = serde_json::to_value(ApiResponse::new(MessageResponse::new("ok"))).unwrap();
        assert_eq!(json["data"]["message"], "ok");
    }
}
