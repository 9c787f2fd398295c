//! Security headers middleware.

use axum::{
    body::Body,
    http::{header::HeaderValue, Request},
    middleware::Next,
    response::Response,
};

/// Security headers middleware.
///
/// Adds `X-Content-Type-Options`, `X-Frame-Options`, `Referrer-Policy` and
/// `X-XSS-Protection` to every response, and `Cache-Control: no-store` to
/// responses that did not set their own caching policy.
///
/// Strict-Transport-Security belongs to the reverse proxy terminating TLS.
pub async fn security_headers(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(
        "Referrer-Policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert("X-XSS-Protection", HeaderValue::from_static("0"));

    // Profiles and file listings are per-user
    if !headers.contains_key("Cache-Control") {
        headers.insert(
            "Cache-Control",
            HeaderValue::from_static("no-store, max-age=0"),
        );
    }

    response
}
