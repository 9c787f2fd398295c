//! HTTP handlers.

pub mod auth;
pub mod drive;
pub mod user;

pub use auth::*;
pub use drive::*;
pub use user::*;

use chrono_tz::Tz;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::auth::IdentityProvider;
use crate::db::Database;
use crate::drive::{EntityStore, ViewCache};
use crate::mail::Mailer;
use crate::web::middleware::SessionState;

/// The record store shared by the drive handlers.
pub type SharedStore = Arc<RwLock<EntityStore>>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Account database.
    pub db: Database,
    /// Drive records.
    pub store: SharedStore,
    /// Memo of the last derived working set.
    pub view_cache: Arc<Mutex<ViewCache>>,
    /// Session keys and cookie settings.
    pub session: Arc<SessionState>,
    /// OAuth login provider.
    pub identity: Arc<dyn IdentityProvider>,
    /// Outgoing mail.
    pub mailer: Arc<dyn Mailer>,
    /// Frontend URL for redirects and emailed links.
    pub frontend_url: String,
    /// Lifetime of password reset links in seconds.
    pub reset_token_ttl_secs: u64,
    /// Zone for calendar comparisons in the recency filter.
    pub timezone: Tz,
}

impl AppState {
    /// Create a new application state.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        db: Database,
        store: SharedStore,
        session: Arc<SessionState>,
        identity: Arc<dyn IdentityProvider>,
        mailer: Arc<dyn Mailer>,
        frontend_url: impl Into<String>,
        reset_token_ttl_secs: u64,
        timezone: Tz,
    ) -> Self {
        Self {
            db,
            store,
            view_cache: Arc::new(Mutex::new(ViewCache::new())),
            session,
            identity,
            mailer,
            frontend_url: frontend_url.into().trim_end_matches('/').to_string(),
            reset_token_ttl_secs,
            timezone,
        }
    }
}
