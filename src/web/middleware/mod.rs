//! Middleware for the HTTP surface.

pub mod cors;
pub mod rate_limit;
pub mod security;
pub mod session;

pub use cors::create_cors_layer;
pub use rate_limit::{auth_rate_limit, RateLimitState};
pub use security::security_headers;
pub use session::{
    session_layer, OptionalSessionUser, SessionState, SessionUser, OAUTH_STATE_COOKIE,
};
