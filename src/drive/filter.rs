//! The filter pipeline.
//!
//! [`derive_view`] applies the kind, type, people, recency and source stages
//! in that order. A stage whose criterion is unset passes everything through,
//! and no stage reorders, so the working set keeps the store's insertion order.

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::category::TypeLabel;
use super::record::{FileRecord, OWNER_ME};
use super::scope::SourceScope;
use super::store::EntityStore;
use crate::datetime::{same_day, same_month};

/// Kind stage: files, folders, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KindMode {
    /// Non-folder records only.
    #[default]
    Files,
    /// Folder records only.
    Folders,
    /// No filtering.
    All,
}

impl KindMode {
    fn keeps(&self, record: &FileRecord) -> bool {
        match self {
            KindMode::Files => !record.is_folder(),
            KindMode::Folders => record.is_folder(),
            KindMode::All => true,
        }
    }
}

impl FromStr for KindMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "files" => Ok(KindMode::Files),
            "folders" => Ok(KindMode::Folders),
            "all" => Ok(KindMode::All),
            _ => Err(format!("unknown kind: {s}")),
        }
    }
}

/// People stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PeopleMode {
    /// Owned by the viewer.
    Owned,
    /// Located in a shared location.
    SharedWithMe,
    /// Owned by the viewer and shared with someone.
    SharedByMe,
}

impl FromStr for PeopleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "owned" => Ok(PeopleMode::Owned),
            "sharedwithme" => Ok(PeopleMode::SharedWithMe),
            "sharedbyme" => Ok(PeopleMode::SharedByMe),
            _ => Err(format!("unknown people filter: {s}")),
        }
    }
}

/// Recency stage window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecencyWindow {
    /// Same calendar day as now.
    Today,
    /// Within the last 7 x 24 hours.
    Week,
    /// Same calendar month and year as now.
    Month,
}

impl RecencyWindow {
    fn contains(&self, ts: &DateTime<Utc>, now: &DateTime<Utc>, tz: Tz) -> bool {
        match self {
            RecencyWindow::Today => same_day(ts, now, tz),
            RecencyWindow::Week => *now - *ts <= Duration::days(7),
            RecencyWindow::Month => same_month(ts, now, tz),
        }
    }
}

impl FromStr for RecencyWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "today" => Ok(RecencyWindow::Today),
            "week" => Ok(RecencyWindow::Week),
            "month" => Ok(RecencyWindow::Month),
            _ => Err(format!("unknown modified window: {s}")),
        }
    }
}

/// The signed-in user the view is computed for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Viewer {
    email: Option<String>,
}

impl Viewer {
    /// A viewer identified by email.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into().to_lowercase()),
        }
    }

    /// A viewer with no known email; only the "me" sentinel counts as theirs.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Viewer email, lower-cased.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Whether the viewer owns `record`.
    pub fn owns(&self, record: &FileRecord) -> bool {
        let owner = record.owner.trim().to_lowercase();
        if owner == OWNER_ME {
            return true;
        }
        self.email.as_deref().is_some_and(|email| owner == email)
    }
}

/// Everything outside the store and the settings that a view depends on.
#[derive(Debug, Clone)]
pub struct FilterContext {
    /// Evaluation instant.
    pub now: DateTime<Utc>,
    /// Zone for calendar comparisons.
    pub tz: Tz,
    /// Who is looking.
    pub viewer: Viewer,
}

impl FilterContext {
    /// Context evaluated at the current time in UTC.
    pub fn new(viewer: Viewer) -> Self {
        Self {
            now: Utc::now(),
            tz: Tz::UTC,
            viewer,
        }
    }

    /// Set the evaluation instant.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Set the calendar time zone.
    pub fn in_timezone(mut self, tz: Tz) -> Self {
        self.tz = tz;
        self
    }
}

/// Current filter settings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    /// Kind stage.
    #[serde(default)]
    pub kind: KindMode,
    /// Type stage.
    #[serde(default, rename = "type")]
    pub type_label: Option<TypeLabel>,
    /// People stage.
    #[serde(default)]
    pub people: Option<PeopleMode>,
    /// Recency stage.
    #[serde(default)]
    pub modified: Option<RecencyWindow>,
    /// Source stage.
    #[serde(default)]
    pub source: Option<SourceScope>,
}

impl FilterConfig {
    /// Settings with every stage passing through.
    pub fn pass_through() -> Self {
        Self {
            kind: KindMode::All,
            ..Self::default()
        }
    }

    /// Scope the working set for a consumer, honouring the global source setting.
    pub fn filter_by_source<'a, I>(&self, records: I, fallback: SourceScope) -> Vec<&'a FileRecord>
    where
        I: IntoIterator<Item = &'a FileRecord>,
    {
        super::scope::filter_by_source(records, self.source, fallback)
    }

    fn keeps(&self, record: &FileRecord, ctx: &FilterContext) -> bool {
        self.kind.keeps(record)
            && self.type_label.map_or(true, |label| label.matches(record))
            && self.people.map_or(true, |mode| people_keeps(mode, record, &ctx.viewer))
            && self.modified.map_or(true, |window| recency_keeps(window, record, ctx))
            && self.source.map_or(true, |scope| scope.matches(record))
    }
}

fn people_keeps(mode: PeopleMode, record: &FileRecord, viewer: &Viewer) -> bool {
    match mode {
        PeopleMode::Owned => viewer.owns(record),
        PeopleMode::SharedWithMe => record.location.to_lowercase().contains("shared"),
        PeopleMode::SharedByMe => viewer.owns(record) && record.is_shared_by_owner(),
    }
}

fn recency_keeps(window: RecencyWindow, record: &FileRecord, ctx: &FilterContext) -> bool {
    match record.activity_time() {
        Some(ts) => window.contains(&ts, &ctx.now, ctx.tz),
        None => false,
    }
}

/// Derive the working set from `records` and the current settings.
pub fn derive_view<'a, I>(records: I, config: &FilterConfig, ctx: &FilterContext) -> Vec<&'a FileRecord>
where
    I: IntoIterator<Item = &'a FileRecord>,
{
    records
        .into_iter()
        .filter(|r| config.keeps(r, ctx))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheKey {
    revision: u64,
    config: FilterConfig,
    tz: Tz,
    viewer: Viewer,
}

/// Memo for the last derived working set.
///
/// Keyed on the store revision, the settings, the viewer and the zone; a miss
/// simply re-runs [`derive_view`]. Settings with a recency window depend on
/// the evaluation instant and are never cached.
#[derive(Debug, Default)]
pub struct ViewCache {
    key: Option<CacheKey>,
    view: Vec<FileRecord>,
}

impl ViewCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the working set, recomputing it when any input changed.
    pub fn get_or_derive(
        &mut self,
        store: &EntityStore,
        config: &FilterConfig,
        ctx: &FilterContext,
    ) -> &[FileRecord] {
        let key = CacheKey {
            revision: store.revision(),
            config: config.clone(),
            tz: ctx.tz,
            viewer: ctx.viewer.clone(),
        };
        let cacheable = config.modified.is_none();
        if !cacheable || self.key.as_ref() != Some(&key) {
            self.view = derive_view(store.records(), config, ctx)
                .into_iter()
                .cloned()
                .collect();
            self.key = cacheable.then_some(key);
        }
        &self.view
    }

    /// Forget the cached view.
    pub fn invalidate(&mut self) {
        self.key = None;
        self.view.clear();
    }
}
