//! Named source scopes (anywhere, my drive, shared, starred, trash).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::record::FileRecord;

/// A named predicate partitioning the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceScope {
    /// Everything not in the bin.
    #[default]
    Anywhere,
    /// Not deleted, located in "My Drive" (or with no location).
    MyDrive,
    /// Not deleted, shared with or by the user.
    Shared,
    /// Starred and not deleted.
    Starred,
    /// Only deleted records.
    Trash,
}

impl SourceScope {
    /// Wire name of the scope.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceScope::Anywhere => "anywhere",
            SourceScope::MyDrive => "myDrive",
            SourceScope::Shared => "shared",
            SourceScope::Starred => "starred",
            SourceScope::Trash => "trash",
        }
    }

    /// Parse a scope name; unknown names fall back to [`SourceScope::Anywhere`].
    pub fn from_name_lenient(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    /// Whether a record belongs to this scope.
    pub fn matches(&self, record: &FileRecord) -> bool {
        match self {
            SourceScope::Anywhere => !record.is_deleted,
            SourceScope::MyDrive => {
                !record.is_deleted
                    && (record.location.is_empty()
                        || record.location.to_lowercase() == "my drive")
            }
            SourceScope::Shared => {
                !record.is_deleted
                    && (record.location.to_lowercase().contains("shared")
                        || record.is_shared_by_owner())
            }
            SourceScope::Starred => record.is_starred && !record.is_deleted,
            SourceScope::Trash => record.is_deleted,
        }
    }
}

impl fmt::Display for SourceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anywhere" => Ok(SourceScope::Anywhere),
            "mydrive" | "my-drive" | "my_drive" => Ok(SourceScope::MyDrive),
            "shared" => Ok(SourceScope::Shared),
            "starred" => Ok(SourceScope::Starred),
            "trash" | "bin" => Ok(SourceScope::Trash),
            _ => Err(format!("unknown source scope: {s}")),
        }
    }
}

/// Keep the records in the active scope.
///
/// The global scope (the pipeline's source setting) wins; `fallback` is used
/// only when no global scope is set.
pub fn filter_by_source<'a, I>(
    records: I,
    global: Option<SourceScope>,
    fallback: SourceScope,
) -> Vec<&'a FileRecord>
where
    I: IntoIterator<Item = &'a FileRecord>,
{
    let scope = global.unwrap_or(fallback);
    records.into_iter().filter(|r| scope.matches(r)).collect()
}
