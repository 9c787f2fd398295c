//! Router configuration.

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use super::handlers::{
    delete_file, failure, forgot_password, google, google_callback, list_files, login, logout,
    page_view, profile, register, reset_password, restore_file, star_file, touch_file,
    trash_file, AppState,
};
use super::middleware::{
    auth_rate_limit, create_cors_layer, security_headers, session_layer, RateLimitState,
};

/// Create the main router: `/auth`, `/user` and `/api/files`.
pub fn create_router(
    app_state: Arc<AppState>,
    rate_limit: Arc<RateLimitState>,
    cors_origins: &[String],
) -> Router {
    // Endpoints that take credentials or send mail are rate limited per IP
    let limited_auth_routes = Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .layer(middleware::from_fn(move |req, next| {
            let state = rate_limit.clone();
            auth_rate_limit(state, req, next)
        }));

    let auth_routes = Router::new()
        .route("/logout", get(logout))
        .route("/google", get(google))
        .route("/google/callback", get(google_callback))
        .route("/failure", get(failure))
        .merge(limited_auth_routes);

    let user_routes = Router::new().route("/profile", get(profile));

    let file_routes = Router::new()
        .route("/", get(list_files))
        .route("/page/:page", get(page_view))
        .route("/:id", delete(delete_file))
        .route("/:id/star", post(star_file))
        .route("/:id/trash", post(trash_file))
        .route("/:id/restore", post(restore_file))
        .route("/:id/touch", post(touch_file));

    let session = app_state.session.clone();

    Router::new()
        .nest("/auth", auth_routes)
        .nest("/user", user_routes)
        .nest("/api/files", file_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins, &app_state.frontend_url))
                .layer(middleware::from_fn(security_headers))
                .layer(middleware::from_fn(move |req, next| {
                    let state = session.clone();
                    session_layer(state, req, next)
                })),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Serve the built frontend, falling back to `index.html` for client routes.
///
/// Returns `None` when `static_path` is not a directory.
pub fn create_static_router(static_path: &str) -> Option<Router> {
    let root = Path::new(static_path);
    if !root.is_dir() {
        tracing::warn!("Static path does not exist: {}", static_path);
        return None;
    }
    let index = ServeFile::new(root.join("index.html"));
    Some(Router::new().fallback_service(ServeDir::new(root).fallback(index)))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use http_body_util::BodyExt;
    use tower::util::ServiceExt;

    #[tokio::test]
    async fn test_health_router() {
        let response = create_health_router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn test_static_router_spa_fallback() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>drive</html>").unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log(1)").unwrap();

        let router = create_static_router(dir.path().to_str().unwrap()).unwrap();

        let asset = router
            .clone()
            .oneshot(Request::builder().uri("/app.js").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(asset.status(), StatusCode::OK);

        let client_route = router
            .oneshot(Request::builder().uri("/starred").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(client_route.status(), StatusCode::OK);
        let body = client_route.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"<html>drive</html>");
    }

    #[test]
    fn test_static_router_missing_dir() {
        assert!(create_static_router("/nonexistent/askar/dist").is_none());
    }
}
