//! File and folder records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::datetime::parse_timestamp;

/// Record identifier.
pub type FileId = i64;

/// Owner value that stands for the signed-in user.
pub const OWNER_ME: &str = "me";

/// Explicit `type` value marking a folder.
pub const FOLDER_TYPE: &str = "folder";

/// A file or folder entry in the drive.
///
/// Timestamps are kept as the strings they arrived as, so a malformed value
/// survives and can be excluded by the recency filter instead of failing the
/// whole listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Stable identity.
    pub id: FileId,
    /// Display name.
    pub name: String,
    /// Explicit kind ("folder" or a MIME type). Inferred from `name` when absent.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    /// Owner email, or [`OWNER_ME`].
    #[serde(default)]
    pub owner: String,
    /// Free-text location label ("My Drive", "Shared with me", ...).
    #[serde(default)]
    pub location: String,
    /// Recipients the owner shared this record with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_with: Option<Vec<String>>,
    /// Creation time.
    #[serde(default, alias = "date", skip_serializing_if = "Option::is_none")]
    pub date_uploaded: Option<String>,
    /// Legacy creation time field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<String>,
    /// Last time the record was opened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_accessed_at: Option<String>,
    /// Starred by the user.
    #[serde(default)]
    pub is_starred: bool,
    /// In the bin.
    #[serde(default)]
    pub is_deleted: bool,
    /// Icon URL.
    #[serde(default)]
    pub icon: String,
}

impl FileRecord {
    /// Create a record with only the required fields set.
    pub fn new(id: FileId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            file_type: None,
            owner: String::new(),
            location: String::new(),
            shared_with: None,
            date_uploaded: None,
            uploaded_at: None,
            last_accessed_at: None,
            is_starred: false,
            is_deleted: false,
            icon: String::new(),
        }
    }

    /// Set the explicit type.
    pub fn with_type(mut self, file_type: impl Into<String>) -> Self {
        self.file_type = Some(file_type.into());
        self
    }

    /// Set the owner.
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    /// Set the location label.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Set the recipients.
    pub fn with_shared_with<I, S>(mut self, recipients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shared_with = Some(recipients.into_iter().map(Into::into).collect());
        self
    }

    /// Set the upload date.
    pub fn with_date_uploaded(mut self, value: impl Into<String>) -> Self {
        self.date_uploaded = Some(value.into());
        self
    }

    /// Set the legacy upload date.
    pub fn with_uploaded_at(mut self, value: impl Into<String>) -> Self {
        self.uploaded_at = Some(value.into());
        self
    }

    /// Set the last access time.
    pub fn with_last_accessed_at(mut self, value: impl Into<String>) -> Self {
        self.last_accessed_at = Some(value.into());
        self
    }

    /// Set the starred flag.
    pub fn starred(mut self, starred: bool) -> Self {
        self.is_starred = starred;
        self
    }

    /// Set the deleted flag.
    pub fn deleted(mut self, deleted: bool) -> Self {
        self.is_deleted = deleted;
        self
    }

    /// Set the icon URL.
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    /// Lower-cased explicit type, empty when absent.
    pub fn type_lower(&self) -> String {
        self.file_type.as_deref().unwrap_or_default().to_lowercase()
    }

    /// Whether the explicit type marks this record as a folder.
    pub fn is_folder(&self) -> bool {
        self.type_lower() == FOLDER_TYPE
    }

    /// Whether the owner shared this record with anyone.
    pub fn is_shared_by_owner(&self) -> bool {
        self.shared_with.as_ref().is_some_and(|r| !r.is_empty())
    }

    /// Timestamp used by the recency filter.
    ///
    /// The first present value of `lastAccessedAt`, `dateUploaded`,
    /// `uploadedAt` is parsed; `None` when it is missing or malformed.
    pub fn activity_time(&self) -> Option<DateTime<Utc>> {
        first_present(&[
            &self.last_accessed_at,
            &self.date_uploaded,
            &self.uploaded_at,
        ])
        .and_then(parse_timestamp)
    }

    /// Timestamp used by the "date" sort key.
    ///
    /// Same idea as [`activity_time`](Self::activity_time) with the legacy
    /// `uploadedAt` ahead of `dateUploaded`.
    pub fn sort_time(&self) -> Option<DateTime<Utc>> {
        first_present(&[
            &self.last_accessed_at,
            &self.uploaded_at,
            &self.date_uploaded,
        ])
        .and_then(parse_timestamp)
    }
}

fn first_present<'a>(fields: &[&'a Option<String>]) -> Option<&'a str> {
    fields
        .iter()
        .filter_map(|f| f.as_deref())
        .find(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{
            "id": 1,
            "name": "AI Ethics Assignment.pdf",
            "owner": "professor@aub.edu.lb",
            "location": "My Drive",
            "dateUploaded": "2025-11-05T00:00:00Z",
            "lastAccessedAt": "2023-11-10T00:00:00Z",
            "isStarred": true,
            "isDeleted": false,
            "icon": "https://example.com/pdf.png"
        }"#;

        let record: FileRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, 1);
        assert_eq!(record.owner, "professor@aub.edu.lb");
        assert!(record.is_starred);
        assert!(!record.is_deleted);
        assert!(record.file_type.is_none());
        assert!(record.shared_with.is_none());
    }

    #[test]
    fn test_type_field_name() {
        let record = FileRecord::new(1, "Projects").with_type("folder");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "folder");
        assert_eq!(value["isStarred"], false);
        assert!(value.get("sharedWith").is_none());
    }

    #[test]
    fn test_date_alias() {
        let record: FileRecord =
            serde_json::from_str(r#"{"id": 2, "name": "x", "date": "2024-01-01"}"#).unwrap();
        assert_eq!(record.date_uploaded.as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn test_is_folder_case_insensitive() {
        assert!(FileRecord::new(1, "a").with_type("Folder").is_folder());
        assert!(!FileRecord::new(1, "a").with_type("application/pdf").is_folder());
        assert!(!FileRecord::new(1, "folder").is_folder());
    }

    #[test]
    fn test_is_shared_by_owner() {
        assert!(!FileRecord::new(1, "a").is_shared_by_owner());
        assert!(!FileRecord::new(1, "a")
            .with_shared_with(Vec::<String>::new())
            .is_shared_by_owner());
        assert!(FileRecord::new(1, "a")
            .with_shared_with(["bob@example.com"])
            .is_shared_by_owner());
    }

    #[test]
    fn test_activity_time_priority() {
        let record = FileRecord::new(1, "a")
            .with_uploaded_at("2020-01-01T00:00:00Z")
            .with_date_uploaded("2021-01-01T00:00:00Z");
        assert_eq!(
            record.activity_time(),
            Some(Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap())
        );

        let record = record.with_last_accessed_at("2022-01-01T00:00:00Z");
        assert_eq!(
            record.activity_time(),
            Some(Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_activity_time_invalid_does_not_fall_through() {
        let record = FileRecord::new(1, "a")
            .with_last_accessed_at("garbage")
            .with_date_uploaded("2021-01-01T00:00:00Z");
        assert!(record.activity_time().is_none());
    }

    #[test]
    fn test_sort_time_prefers_legacy_upload_field() {
        let record = FileRecord::new(1, "a")
            .with_uploaded_at("2020-01-01T00:00:00Z")
            .with_date_uploaded("2021-01-01T00:00:00Z");
        assert_eq!(
            record.sort_time(),
            Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_empty_timestamp_is_skipped() {
        let record = FileRecord::new(1, "a")
            .with_last_accessed_at("")
            .with_date_uploaded("2021-01-01");
        assert!(record.activity_time().is_some());
    }
}
