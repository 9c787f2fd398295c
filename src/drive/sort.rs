//! Page-local sorting.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::record::FileRecord;

/// Column a page is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    Name,
    /// The owner column.
    SharedBy,
    Date,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::SharedBy => "sharedBy",
            SortKey::Date => "date",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "sharedby" | "owner" => Ok(SortKey::SharedBy),
            "date" => Ok(SortKey::Date),
            _ => Err(format!("unknown sort key: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// The opposite direction.
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(format!("unknown sort direction: {s}")),
        }
    }
}

/// Active sort column and direction of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Column header click: flip on the active key, otherwise select `key` ascending.
    pub fn click(&mut self, key: SortKey) {
        if self.key == key {
            self.direction = self.direction.flipped();
        } else {
            self.key = key;
            self.direction = SortDirection::Asc;
        }
    }

    /// Arrow shown next to a column header.
    pub fn indicator(&self, key: SortKey) -> &'static str {
        if self.key != key {
            return "";
        }
        match self.direction {
            SortDirection::Asc => " ↑",
            SortDirection::Desc => " ↓",
        }
    }

    /// Compare two records under this state.
    pub fn compare(&self, a: &FileRecord, b: &FileRecord) -> Ordering {
        let ord = match self.key {
            SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortKey::SharedBy => a.owner.to_lowercase().cmp(&b.owner.to_lowercase()),
            // None < Some, so missing or bad dates come first ascending.
            SortKey::Date => a.sort_time().cmp(&b.sort_time()),
        };
        match self.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

/// Stable sort of `records` in place.
pub fn sort_records<R>(records: &mut [R], state: &SortState)
where
    R: AsRef<FileRecord>,
{
    records.sort_by(|a, b| state.compare(a.as_ref(), b.as_ref()));
}

impl AsRef<FileRecord> for FileRecord {
    fn as_ref(&self) -> &FileRecord {
        self
    }
}
