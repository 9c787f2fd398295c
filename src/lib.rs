//! askar - the 3askar Drive server.
//!
//! A Drive-style file view engine (in-memory records, a fixed-order filter
//! pipeline, named scopes and sorted page views) behind a cookie-session
//! authentication backend with password, Google OAuth and password reset
//! flows.

pub mod auth;
pub mod config;
pub mod datetime;
pub mod db;
pub mod drive;
pub mod error;
pub mod logging;
pub mod mail;
pub mod web;

pub use auth::{
    hash_password, validate_email, validate_password, verify_password, PasswordError,
    SessionError, ValidationError,
};
pub use config::Config;
pub use db::{Database, NewUser, User, UserRepository};
pub use drive::{EntityStore, FileRecord, FilterConfig, PageView, SourceScope};
pub use error::{AskarError, Result};
pub use web::WebServer;
