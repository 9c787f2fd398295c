//! Drive core: the record store and the views derived from it.
//!
//! Everything here is synchronous and free of I/O apart from [`seed`], which
//! reads the optional seed file. Data flows one way:
//!
//! ```text
//! EntityStore -> derive_view (kind, type, people, recency, source)
//!             -> PageState::render (page scope, stable sort)
//! ```

pub mod category;
pub mod filter;
pub mod record;
pub mod scope;
pub mod seed;
pub mod sort;
pub mod store;
pub mod view;

pub use category::{classify, TypeLabel};
pub use filter::{
    derive_view, FilterConfig, FilterContext, KindMode, PeopleMode, RecencyWindow, ViewCache,
    Viewer,
};
pub use record::{FileId, FileRecord, FOLDER_TYPE, OWNER_ME};
pub use scope::{filter_by_source, SourceScope};
pub use sort::{sort_records, SortDirection, SortKey, SortState};
pub use store::{EntityStore, StoreError};
pub use view::{PageState, PageView};
