//! Page views: My Drive, Starred, Shared and Bin.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::filter::FilterConfig;
use super::record::FileRecord;
use super::scope::SourceScope;
use super::sort::{sort_records, SortState};

/// A page of the drive UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageView {
    MyDrive,
    Starred,
    Shared,
    Bin,
}

impl PageView {
    /// Scope the page asks for.
    pub fn scope(&self) -> SourceScope {
        match self {
            PageView::MyDrive => SourceScope::MyDrive,
            PageView::Starred => SourceScope::Starred,
            PageView::Shared => SourceScope::Shared,
            PageView::Bin => SourceScope::Trash,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            PageView::MyDrive => "My Drive",
            PageView::Starred => "Starred",
            PageView::Shared => "Shared with me",
            PageView::Bin => "Bin",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PageView::MyDrive => "mydrive",
            PageView::Starred => "starred",
            PageView::Shared => "shared",
            PageView::Bin => "bin",
        }
    }
}

impl fmt::Display for PageView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mydrive" | "my-drive" => Ok(PageView::MyDrive),
            "starred" => Ok(PageView::Starred),
            "shared" => Ok(PageView::Shared),
            "bin" | "trash" => Ok(PageView::Bin),
            _ => Err(format!("unknown page: {s}")),
        }
    }
}

/// Page-local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub page: PageView,
    pub sort: SortState,
}

impl PageState {
    pub fn new(page: PageView) -> Self {
        Self {
            page,
            sort: SortState::default(),
        }
    }

    pub fn with_sort(mut self, sort: SortState) -> Self {
        self.sort = sort;
        self
    }

    /// Scope the working set to this page, then sort it.
    ///
    /// The pipeline's own source setting, when set, overrides the page scope.
    pub fn render<'a>(&self, working_set: &[&'a FileRecord], config: &FilterConfig) -> Vec<&'a FileRecord> {
        let mut rows = config.filter_by_source(working_set.iter().copied(), self.page.scope());
        sort_records(&mut rows, &self.sort);
        rows
    }
}
