//! Application-layer rate limiting for login, OTP and registration routes

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use http::request::Parts;
use shared::error::{AppError, ErrorCode};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::security_log;
use crate::state::AppState;

struct IpEntry {
    count: u32,
    window_start: Instant,
}

#[derive(Clone, Default)]
pub struct RateLimiter {
    /// route name -> (IP -> entry)
    inner: Arc<Mutex<HashMap<&'static str, HashMap<String, IpEntry>>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the request is allowed, `false` if rate-limited.
    pub async fn check(
        &self,
        route: &'static str,
        ip: &str,
        max_requests: u32,
        window_secs: u64,
    ) -> bool {
        let mut map = self.inner.lock().await;
        let route_map = map.entry(route).or_default();
        let now = Instant::now();

        let entry = route_map.entry(ip.to_owned()).or_insert_with(|| IpEntry {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start).as_secs() >= window_secs {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;
        entry.count <= max_requests
    }

    /// Remove entries older than 5 minutes
    pub async fn cleanup(&self) {
        let mut map = self.inner.lock().await;
        let cutoff = std::time::Duration::from_secs(300);
        let now = Instant::now();

        for route_map in map.values_mut() {
            route_map.retain(|_, entry| now.duration_since(entry.window_start) < cutoff);
        }

        map.retain(|_, route_map| !route_map.is_empty());
    }

    #[cfg(test)]
    async fn tracked_ips(&self) -> usize {
        self.inner.lock().await.values().map(HashMap::len).sum()
    }
}

/// Extract client IP: X-Forwarded-For header first, then peer address.
pub fn extract_ip(request: &Request) -> String {
    client_ip(request.headers(), request.extensions())
}

fn client_ip(headers: &http::HeaderMap, extensions: &http::Extensions) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
        && let Some(first) = val.split(',').next()
    {
        let ip = first.trim();
        if !ip.is_empty() {
            return ip.to_owned();
        }
    }

    extensions
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

/// Client IP as a handler argument
pub struct ClientIp(pub String);

impl<S: Send + Sync> FromRequestParts<S> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientIp(client_ip(&parts.headers, &parts.extensions)))
    }
}

async fn limit(
    state: &AppState,
    route: &'static str,
    max_requests: u32,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = extract_ip(&request);
    if !state.rate_limiter.check(route, &ip, max_requests, 60).await {
        security_log!(WARN, "rate_limited", route = route, ip = %ip);
        return Err(AppError::new(ErrorCode::TooManyRequests));
    }
    Ok(next.run(request).await)
}

/// Password login: 10 requests/minute per IP
pub async fn login_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    limit(&state, "login", 10, request, next).await
}

/// OTP request/verify: 5 requests/minute per IP
pub async fn otp_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    limit(&state, "otp", 5, request, next).await
}

/// Restaurant onboarding and customer sign-up: 5 requests/minute per IP
pub async fn register_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    limit(&state, "register", 5, request, next).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blocks_after_limit() {
        let limiter = RateLimiter::new();
        for _ in 0..3 {
            assert!(limiter.check("login", "1.2.3.4", 3, 60).await);
        }
        assert!(!limiter.check("login", "1.2.3.4", 3, 60).await);
        // other IPs and routes are independent
        assert!(limiter.check("login", "5.6.7.8", 3, 60).await);
        assert!(limiter.check("otp", "1.2.3.4", 3, 60).await);
    }

    #[tokio::test(start_paused = true)]
    async fn window_resets() {
        let limiter = RateLimiter::new();
        assert!(limiter.check("otp", "ip", 1, 60).await);
        assert!(!limiter.check("otp", "ip", 1, 60).await);
        tokio::time::advance(std::time::Duration::from_secs(61)).await;
        assert!(limiter.check("otp", "ip", 1, 60).await);
    }

    #[tokio::test(start_paused = true)]
    async fn cleanup_drops_stale_entries() {
        let limiter = RateLimiter::new();
        limiter.check("login", "ip", 5, 60).await;
        assert_eq!(limiter.tracked_ips().await, 1);
        tokio::time::advance(std::time::Duration::from_secs(301)).await;
        limiter.cleanup().await;
        assert_eq!(limiter.tracked_ips().await, 0);
    }

    #[test]
    fn forwarded_for_wins() {
        let request = http::Request::builder()
            .header("x-forwarded-for", "9.9.9.9, 10.0.0.1")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(extract_ip(&request), "9.9.9.9");

        let bare = http::Request::builder().body(axum::body::Body::empty()).unwrap();
        assert_eq!(extract_ip(&bare), "unknown");
    }
}
