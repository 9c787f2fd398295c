//! Web server for askar.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::compression::CompressionLayer;

use crate::auth::{GoogleProvider, SessionKeys};
use crate::config::{Config, ServerConfig};
use crate::datetime::parse_timezone;
use crate::db::{Database, PasswordResetRepository};
use crate::drive::EntityStore;
use crate::{AskarError, Result};

use super::handlers::AppState;
use super::middleware::{RateLimitState, SessionState};
use super::router::{create_health_router, create_router, create_static_router};

/// HTTP server for the auth backend and the drive API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Rate limiters for the credential endpoints.
    rate_limit: Arc<RateLimitState>,
    /// Server configuration.
    server_config: ServerConfig,
}

impl WebServer {
    /// Create a server around an existing application state.
    pub fn new(config: &ServerConfig, app_state: AppState) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| AskarError::Config(format!("invalid server address: {e}")))?;

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            rate_limit: Arc::new(RateLimitState::new(config.auth_rate_limit)),
            server_config: config.clone(),
        })
    }

    /// Wire up the production collaborators from configuration.
    pub fn from_config(config: &Config, db: Database, store: EntityStore) -> Result<Self> {
        let session = SessionState::new(
            SessionKeys::new(&config.session.secret, config.session.expiry_secs),
            config.session.cookie_name.clone(),
            config.session.secure_cookie,
        );
        if !config.oauth.is_enabled() {
            tracing::warn!("Google OAuth is not configured; /auth/google will fail");
        }

        let app_state = AppState::new(
            db,
            Arc::new(RwLock::new(store)),
            Arc::new(session),
            Arc::new(GoogleProvider::new(config.oauth.clone())),
            crate::mail::from_config(&config.mail)?,
            config.server.frontend_url.clone(),
            config.mail.reset_token_expiry_secs,
            parse_timezone(&config.drive.timezone),
        );

        Self::new(&config.server, app_state)
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// The complete router: API, health check and optional static files.
    pub fn router(&self) -> Router {
        let mut router = create_router(
            self.app_state.clone(),
            self.rate_limit.clone(),
            &self.server_config.cors_origins,
        )
        .merge(create_health_router());

        if self.server_config.serve_static {
            if let Some(static_router) = create_static_router(&self.server_config.static_path) {
                router = router.merge(static_router);
            }
        }

        router.layer(CompressionLayer::new())
    }

    /// Start the reset token cleanup background task.
    ///
    /// Runs every hour and removes expired and used password reset tokens.
    fn start_token_cleanup_task(db: Database) {
        tokio::spawn(async move {
            const CLEANUP_INTERVAL_SECS: u64 = 3600;

            let mut interval = tokio::time::interval(Duration::from_secs(CLEANUP_INTERVAL_SECS));

            // Skip the first immediate tick
            interval.tick().await;

            loop {
                interval.tick().await;

                let repo = PasswordResetRepository::new(db.pool());
                match repo.cleanup().await {
                    Ok(count) if count > 0 => {
                        tracing::info!(
                            deleted_count = count,
                            "Cleaned up expired/used password reset tokens"
                        );
                    }
                    Ok(_) => tracing::debug!("No expired reset tokens to clean up"),
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to cleanup reset tokens");
                    }
                }
            }
        });
    }

    async fn bind(self) -> std::io::Result<(TcpListener, Router, SocketAddr)> {
        let router = self.router();

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        // Start background tasks after successful bind
        Self::start_token_cleanup_task(self.app_state.db.clone());
        self.rate_limit.clone().start_cleanup_task();
        tracing::info!("Token cleanup task started (runs every hour)");

        tracing::info!("Web server listening on http://{}", local_addr);
        Ok((listener, router, local_addr))
    }

    /// Run the web server.
    pub async fn run(self) -> std::io::Result<()> {
        let (listener, router, _) = self.bind().await?;
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
    }

    /// Run the server in the background and return the bound address.
    ///
    /// Binding to port 0 picks a free port.
    pub async fn run_with_addr(self) -> std::io::Result<SocketAddr> {
        let (listener, router, local_addr) = self.bind().await?;

        tokio::spawn(async move {
            let service = router.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, service).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn create_test_config() -> (Config, Database) {
        let mut config = Config::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0;
        config.session.secret = "test-secret-key".to_string();

        let db = Database::open_in_memory().await.unwrap();
        (config, db)
    }

    #[tokio::test]
    async fn test_web_server_new() {
        let (config, db) = create_test_config().await;

        let server = WebServer::from_config(&config, db, EntityStore::new()).unwrap();
        assert_eq!(server.addr().ip().to_string(), "127.0.0.1");
    }

    #[tokio::test]
    async fn test_invalid_address_rejected() {
        let (mut config, db) = create_test_config().await;
        config.server.host = "not a host".to_string();

        let result = WebServer::from_config(&config, db, EntityStore::new());
        assert!(matches!(result, Err(AskarError::Config(_))));
    }

    #[tokio::test]
    async fn test_web_server_run() {
        let (config, db) = create_test_config().await;

        let server = WebServer::from_config(&config, db, EntityStore::new()).unwrap();
        let addr = server.run_with_addr().await.unwrap();

        let client = reqwest::Client::new();
        let resp = client
            .get(format!("http://{}/health", addr))
            .send()
            .await
            .unwrap();

        assert!(resp.status().is_success());
        assert_eq!(resp.text().await.unwrap(), "OK");
    }
}
