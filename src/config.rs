//! Configuration module for askar.

use serde::Deserialize;
use std::path::Path;

use crate::{AskarError, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of the single-page frontend (redirect target after login/logout).
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Whether to serve the built frontend.
    #[serde(default)]
    pub serve_static: bool,
    /// Path to the built frontend.
    #[serde(default = "default_static_path")]
    pub static_path: String,
    /// Rate limit for login and password reset endpoints (requests per minute).
    #[serde(default = "default_auth_rate_limit")]
    pub auth_rate_limit: u32,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_frontend_url() -> String {
    "http://localhost:5173".to_string()
}

fn default_static_path() -> String {
    "frontend/dist".to_string()
}

fn default_auth_rate_limit() -> u32 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            frontend_url: default_frontend_url(),
            cors_origins: vec![],
            serve_static: false,
            static_path: default_static_path(),
            auth_rate_limit: default_auth_rate_limit(),
        }
    }
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Secret used to sign session tokens (must be set).
    #[serde(default)]
    pub secret: String,
    /// Session lifetime in seconds.
    #[serde(default = "default_session_expiry")]
    pub expiry_secs: u64,
    /// Name of the session cookie.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Mark the cookie `Secure` (HTTPS only).
    #[serde(default)]
    pub secure_cookie: bool,
}

fn default_session_expiry() -> u64 {
    24 * 60 * 60
}

fn default_cookie_name() -> String {
    "askar_session".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            expiry_secs: default_session_expiry(),
            cookie_name: default_cookie_name(),
            secure_cookie: false,
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/askar.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Drive view configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveConfig {
    /// JSON file with the initial records. Empty means the built-in seed.
    #[serde(default)]
    pub seed_path: String,
    /// Time zone for "today" and "this month" comparisons (e.g. "Asia/Beirut", "UTC").
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            seed_path: String::new(),
            timezone: default_timezone(),
        }
    }
}

/// Google OAuth configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthConfig {
    /// OAuth client ID. Google login is disabled while empty.
    #[serde(default)]
    pub client_id: String,
    /// OAuth client secret.
    #[serde(default)]
    pub client_secret: String,
    /// Callback URL registered with the provider.
    #[serde(default = "default_redirect_url")]
    pub redirect_url: String,
    /// Authorization endpoint.
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    /// Token endpoint.
    #[serde(default = "default_token_url")]
    pub token_url: String,
    /// Userinfo endpoint.
    #[serde(default = "default_userinfo_url")]
    pub userinfo_url: String,
}

fn default_redirect_url() -> String {
    "http://localhost:5000/auth/google/callback".to_string()
}

fn default_auth_url() -> String {
    "https://accounts.google.com/o/oauth2/v2/auth".to_string()
}

fn default_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_userinfo_url() -> String {
    "https://openidconnect.googleapis.com/v1/userinfo".to_string()
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_url: default_redirect_url(),
            auth_url: default_auth_url(),
            token_url: default_token_url(),
            userinfo_url: default_userinfo_url(),
        }
    }
}

impl OAuthConfig {
    /// Whether Google login is configured.
    pub fn is_enabled(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

/// Outgoing mail configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// Send mail through SMTP. When false, messages are only logged.
    #[serde(default)]
    pub enabled: bool,
    /// SMTP relay host.
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    /// SMTP relay port (submission over STARTTLS).
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP account, also used as the sender address.
    #[serde(default)]
    pub username: String,
    /// SMTP password.
    #[serde(default)]
    pub password: String,
    /// Display name in the From header.
    #[serde(default = "default_from_name")]
    pub from_name: String,
    /// Lifetime of password reset links in seconds.
    #[serde(default = "default_reset_expiry")]
    pub reset_token_expiry_secs: u64,
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from_name() -> String {
    "3askar Drive".to_string()
}

fn default_reset_expiry() -> u64 {
    3600
}

/// Upper bound for `reset_token_expiry_secs` (one week).
pub const MAX_RESET_TOKEN_EXPIRY_SECS: u64 = 7 * 24 * 60 * 60;

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            from_name: default_from_name(),
            reset_token_expiry_secs: default_reset_expiry(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file. Empty logs to the console only.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/askar.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server.
    #[serde(default)]
    pub server: ServerConfig,
    /// Session cookies.
    #[serde(default)]
    pub session: SessionConfig,
    /// Account database.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Drive views.
    #[serde(default)]
    pub drive: DriveConfig,
    /// Google OAuth.
    #[serde(default)]
    pub oauth: OAuthConfig,
    /// Outgoing mail.
    #[serde(default)]
    pub mail: MailConfig,
    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(AskarError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| AskarError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides.
    ///
    /// Supported variables:
    /// - `ASKAR_SESSION_SECRET`: session signing secret
    /// - `GOOGLE_CLIENT_ID` / `GOOGLE_CLIENT_SECRET`: OAuth client credentials
    /// - `EMAIL_USER` / `EMAIL_PASS`: SMTP credentials
    pub fn apply_env_overrides(&mut self) {
        override_from_env("ASKAR_SESSION_SECRET", &mut self.session.secret);
        override_from_env("GOOGLE_CLIENT_ID", &mut self.oauth.client_id);
        override_from_env("GOOGLE_CLIENT_SECRET", &mut self.oauth.client_secret);
        override_from_env("EMAIL_USER", &mut self.mail.username);
        override_from_env("EMAIL_PASS", &mut self.mail.password);
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - the session secret is empty
    /// - SMTP delivery is enabled without credentials
    /// - the reset link lifetime is zero or longer than a week
    /// - the drive time zone is not a known IANA name
    pub fn validate(&self) -> Result<()> {
        if self.session.secret.is_empty() {
            return Err(AskarError::Config(
                "session secret is not set. \
                 Set it in config.toml or via ASKAR_SESSION_SECRET environment variable."
                    .to_string(),
            ));
        }
        if self.mail.enabled && (self.mail.username.is_empty() || self.mail.password.is_empty()) {
            return Err(AskarError::Config(
                "mail is enabled but SMTP credentials are missing (EMAIL_USER / EMAIL_PASS)"
                    .to_string(),
            ));
        }
        if self.mail.reset_token_expiry_secs == 0
            || self.mail.reset_token_expiry_secs > MAX_RESET_TOKEN_EXPIRY_SECS
        {
            return Err(AskarError::Config(format!(
                "mail.reset_token_expiry_secs must be between 1 and {MAX_RESET_TOKEN_EXPIRY_SECS}"
            )));
        }
        if self.drive.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(AskarError::Config(format!(
                "unknown time zone: {}",
                self.drive.timezone
            )));
        }
        Ok(())
    }
}

fn override_from_env(name: &str, target: &mut String) {
    if let Ok(value) = std::env::var(name) {
        if !value.is_empty() {
            *target = value;
        }
    }
}
