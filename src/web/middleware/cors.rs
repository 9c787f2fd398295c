//! CORS middleware configuration.

use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

/// Create a CORS layer from configuration.
///
/// The session travels in a cookie, so credentialed requests must name their
/// origins. With no `origins` configured the frontend URL is the only one
/// allowed.
pub fn create_cors_layer(origins: &[String], frontend_url: &str) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];

    let configured: Vec<&str> = if origins.is_empty() {
        vec![frontend_url.trim_end_matches('/')]
    } else {
        origins.iter().map(String::as_str).collect()
    };
    let parsed_origins: Vec<HeaderValue> =
        configured.iter().filter_map(|o| o.parse().ok()).collect();

    if parsed_origins.is_empty() {
        tracing::warn!("No valid CORS origin configured; cross-origin cookies are disabled");
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers(Any)
            .allow_origin(Any)
    } else {
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([CONTENT_TYPE, ACCEPT])
            .allow_credentials(true)
            .allow_origin(parsed_origins)
    }
}
