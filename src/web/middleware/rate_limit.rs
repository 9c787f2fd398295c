//! Per-IP rate limiting for the credential endpoints.

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::{
    collections::HashMap,
    net::SocketAddr,
    num::NonZeroU32,
    sync::{Arc, RwLock},
    time::Duration,
};

use crate::web::error::ApiError;

/// Per-IP rate limiter using Governor.
pub type IpRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// State for rate limiting.
#[derive(Clone)]
pub struct RateLimitState {
    /// Per-IP limiters for login, registration and password reset.
    auth_limiters: Arc<RwLock<HashMap<String, Arc<IpRateLimiter>>>>,
    /// Requests per minute.
    auth_rate_limit: u32,
}

impl RateLimitState {
    /// Create a new rate limit state.
    pub fn new(auth_rate_limit: u32) -> Self {
        Self {
            auth_limiters: Arc::new(RwLock::new(HashMap::new())),
            auth_rate_limit,
        }
    }

    fn get_or_create_limiter(&self, ip: &str) -> Arc<IpRateLimiter> {
        {
            let read_guard = self.auth_limiters.read().unwrap_or_else(|e| e.into_inner());
            if let Some(limiter) = read_guard.get(ip) {
                return limiter.clone();
            }
        }

        let mut write_guard = self.auth_limiters.write().unwrap_or_else(|e| e.into_inner());

        // Double-check after acquiring write lock
        if let Some(limiter) = write_guard.get(ip) {
            return limiter.clone();
        }

        let quota =
            Quota::per_minute(NonZeroU32::new(self.auth_rate_limit).unwrap_or(NonZeroU32::MIN));
        let limiter = Arc::new(RateLimiter::direct(quota));
        write_guard.insert(ip.to_string(), limiter.clone());
        limiter
    }

    /// Check if a request from `ip` is allowed.
    pub fn check(&self, ip: &str) -> bool {
        self.get_or_create_limiter(ip).check().is_ok()
    }

    /// Drop limiters nobody holds.
    pub fn cleanup(&self) {
        let mut guard = self.auth_limiters.write().unwrap_or_else(|e| e.into_inner());
        guard.retain(|_, v| Arc::strong_count(v) > 1);
    }

    /// Number of tracked clients.
    pub fn tracked(&self) -> usize {
        self.auth_limiters
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Start a background task to periodically clean up old entries.
    pub fn start_cleanup_task(self: Arc<Self>) {
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(300)).await;
                self.cleanup();
            }
        });
    }
}

/// Extract client IP from request.
fn get_client_ip(req: &Request<Body>) -> String {
    // Reverse proxy first
    if let Some(forwarded) = req
        .headers()
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(ip) = forwarded.split(',').next() {
            return ip.trim().to_string();
        }
    }

    if let Some(real_ip) = req
        .headers()
        .get("X-Real-IP")
        .and_then(|v| v.to_str().ok())
    {
        return real_ip.to_string();
    }

    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    "unknown".to_string()
}

/// Rate limiting middleware for the credential endpoints.
pub async fn auth_rate_limit(
    state: Arc<RateLimitState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = get_client_ip(&req);

    if !state.check(&ip) {
        tracing::warn!(ip = %ip, path = %req.uri().path(), "Auth rate limit exceeded");
        return ApiError::too_many_requests("Too many attempts. Please try again later.")
            .into_response();
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, middleware, routing::post, Router};
    use tower::util::ServiceExt;

    #[test]
    fn test_rate_limit_per_ip() {
        let state = RateLimitState::new(3);

        assert!(state.check("127.0.0.1"));
        assert!(state.check("127.0.0.1"));
        assert!(state.check("127.0.0.1"));
        assert!(!state.check("127.0.0.1"));

        assert!(state.check("192.168.1.1"));
        assert_eq!(state.tracked(), 2);
    }

    #[test]
    fn test_zero_limit_allows_one() {
        let state = RateLimitState::new(0);
        assert!(state.check("10.0.0.1"));
        assert!(!state.check("10.0.0.1"));
    }

    #[test]
    fn test_cleanup_drops_idle_limiters() {
        let state = RateLimitState::new(3);
        state.check("127.0.0.1");
        state.cleanup();
        assert_eq!(state.tracked(), 0);
    }

    #[test]
    fn test_client_ip_from_forwarded_header() {
        let req = Request::builder()
            .header("X-Forwarded-For", "203.0.113.7, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(get_client_ip(&req), "203.0.113.7");

        let req = Request::builder()
            .header("X-Real-IP", "198.51.100.2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(get_client_ip(&req), "198.51.100.2");

        let req = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(get_client_ip(&req), "unknown");
    }

    #[tokio::test]
    async fn test_middleware_returns_429() {
        let state = Arc::new(RateLimitState::new(1));
        let app = Router::new()
            .route("/login", post(|| async { "ok" }))
            .layer(middleware::from_fn(move |req, next| {
                auth_rate_limit(state.clone(), req, next)
            }));

        let request = || {
            Request::builder()
                .method("POST")
                .uri("/login")
                .header("X-Real-IP", "127.0.0.1")
                .body(Body::empty())
                .unwrap()
        };

        let first = app.clone().oneshot(request()).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app.oneshot(request()).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
