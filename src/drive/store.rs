//! In-memory entity store for drive records.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use super::record::{FileId, FileRecord};
use crate::datetime::to_rfc3339_utc;

/// Errors raised when installing a collection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Two records share an id.
    #[error("duplicate record id {0}")]
    DuplicateId(FileId),
}

/// Holds the live collection and applies the mutators.
///
/// Mutators only touch the targeted record. An unknown id is a no-op: the
/// mutator returns `false` and nothing changes. Every successful change bumps
/// [`revision`](Self::revision) so memoized views can tell they are stale.
#[derive(Debug, Clone)]
pub struct EntityStore {
    records: Vec<FileRecord>,
    loading: bool,
    revision: u64,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    /// Create an empty store in the loading state.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            loading: true,
            revision: 0,
        }
    }

    /// Create a store already seeded with `records`.
    pub fn with_records(records: Vec<FileRecord>) -> Result<Self, StoreError> {
        let mut store = Self::new();
        store.seed(records)?;
        Ok(store)
    }

    /// Install the initial collection and leave the loading state.
    pub fn seed(&mut self, records: Vec<FileRecord>) -> Result<(), StoreError> {
        self.replace_all(records)?;
        self.loading = false;
        Ok(())
    }

    /// Replace the whole collection. Ids must be unique.
    pub fn replace_all(&mut self, records: Vec<FileRecord>) -> Result<(), StoreError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id) {
                return Err(StoreError::DuplicateId(record.id));
            }
        }
        self.records = records;
        self.bump();
        Ok(())
    }

    /// Whether the initial seed has not arrived yet.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Change counter, incremented by every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    /// Number of records, including the ones in the bin.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record.
    pub fn get(&self, id: FileId) -> Option<&FileRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Flip the starred flag.
    pub fn toggle_star(&mut self, id: FileId) -> bool {
        self.update(id, "toggle_star", |r| r.is_starred = !r.is_starred)
    }

    /// Move a record to the bin.
    pub fn soft_delete(&mut self, id: FileId) -> bool {
        self.update(id, "soft_delete", |r| r.is_deleted = true)
    }

    /// Take a record out of the bin.
    pub fn restore(&mut self, id: FileId) -> bool {
        self.update(id, "restore", |r| r.is_deleted = false)
    }

    /// Alias of [`restore`](Self::restore) used by the bin page.
    pub fn restore_from_bin(&mut self, id: FileId) -> bool {
        self.restore(id)
    }

    /// Remove a record permanently.
    pub fn delete_forever(&mut self, id: FileId) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        let removed = self.records.len() != before;
        if removed {
            self.bump();
        } else {
            debug!(id, "delete_forever: no such record");
        }
        removed
    }

    /// Set `lastAccessedAt` to now.
    pub fn touch_last_accessed(&mut self, id: FileId) -> bool {
        self.touch_last_accessed_at(id, Utc::now())
    }

    /// Set `lastAccessedAt` to `now`.
    pub fn touch_last_accessed_at(&mut self, id: FileId, now: DateTime<Utc>) -> bool {
        let stamp = to_rfc3339_utc(&now);
        self.update(id, "touch_last_accessed", |r| {
            r.last_accessed_at = Some(stamp)
        })
    }

    fn update<F>(&mut self, id: FileId, op: &'static str, f: F) -> bool
    where
        F: FnOnce(&mut FileRecord),
    {
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                f(record);
                self.bump();
                true
            }
            None => {
                debug!(id, op, "no such record");
                false
            }
        }
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
