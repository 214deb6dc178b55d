use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, request::Parts, HeaderValue, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use crate::error::AppError;
use crate::AppState;

/// Client count above which expired windows are swept on the next check.
const PRUNE_THRESHOLD: usize = 1024;

/// Fixed-window request counter per client address.
#[derive(Clone)]
pub struct RateLimit {
    store: Arc<DashMap<String, RateLimitData>>,
    max_requests: u32,
    window: Duration,
}

#[derive(Debug, Clone)]
struct RateLimitData {
    count: u32,
    window_start: DateTime<Utc>,
}

impl RateLimit {
    pub fn new(max_requests: u32, window: std::time::Duration) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            max_requests,
            window: Duration::from_std(window).unwrap_or_else(|_| Duration::minutes(15)),
        }
    }

    /// Counts one request for `key` and reports whether it is within the limit.
    pub fn check(&self, key: &str, now: DateTime<Utc>) -> bool {
        let mut entry = self.store.entry(key.to_string()).or_insert_with(|| RateLimitData {
            count: 0,
            window_start: now,
        });
        let data = entry.value_mut();

        if now.signed_duration_since(data.window_start) >= self.window {
            data.count = 0;
            data.window_start = now;
        }

        data.count += 1;
        let allowed = data.count <= self.max_requests;
        drop(entry);

        if self.store.len() > PRUNE_THRESHOLD {
            self.prune(now);
        }
        allowed
    }

    /// Drops clients whose window has already ended.
    pub fn prune(&self, now: DateTime<Utc>) {
        let window = self.window;
        self.store
            .retain(|_, data| now.signed_duration_since(data.window_start) < window);
    }

    pub fn tracked_clients(&self) -> usize {
        self.store.len()
    }
}

/// IP-based rate limiting for the `/api` routes.
pub async fn rate_limit(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    req: Request,
    next: Next,
) -> Response {
    let key = connect_info
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    if !state.rate_limit.check(&key, Utc::now()) {
        warn!(client = %key, "rate limit exceeded");
        return AppError::RateLimited.into_response();
    }

    next.run(req).await
}

/// Bounds the whole handler, provider call included.
pub async fn request_timeout(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    match tokio::time::timeout(state.config.request_timeout, next.run(req)).await {
        Ok(response) => response,
        Err(_) => {
            warn!(path = %path, "request timed out after {:?}", state.config.request_timeout);
            AppError::Timeout.into_response()
        }
    }
}

/// Extensions and local development servers are always allowed, as are the
/// configured origins.
pub fn origin_allowed(origin: &str, allowed: &[String]) -> bool {
    origin.starts_with("chrome-extension://")
        || origin.starts_with("http://localhost")
        || allowed.iter().any(|o| o == origin)
}

pub fn cors_layer(allowed: Vec<String>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _: &Parts| {
            origin
                .to_str()
                .map(|o| origin_allowed(o, &allowed))
                .unwrap_or(false)
        }))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_resets_after_window() {
        let limit = RateLimit::new(2, std::time::Duration::from_secs(60));
        let start = Utc::now();
        assert!(limit.check("1.2.3.4", start));
        assert!(limit.check("1.2.3.4", start));
        assert!(!limit.check("1.2.3.4", start));
        assert!(limit.check("5.6.7.8", start));
        assert!(limit.check("1.2.3.4", start + Duration::seconds(61)));
    }

    #[test]
    fn expired_clients_are_pruned() {
        let limit = RateLimit::new(5, std::time::Duration::from_secs(60));
        let start = Utc::now();
        for i in 0..=PRUNE_THRESHOLD {
            assert!(limit.check(&format!("10.0.{}.{}", i / 256, i % 256), start));
        }
        assert_eq!(limit.tracked_clients(), PRUNE_THRESHOLD + 1);

        assert!(limit.check("192.168.0.1", start + Duration::seconds(61)));
        assert_eq!(limit.tracked_clients(), 1);

        limit.prune(start + Duration::seconds(200));
        assert_eq!(limit.tracked_clients(), 0);
    }

    #[test]
    fn origin_rules() {
        let allowed = vec!["https://dashboard.example.com".to_string()];
        assert!(origin_allowed("chrome-extension://abcdef", &allowed));
        assert!(origin_allowed("http://localhost:3000", &allowed));
        assert!(origin_allowed("https://dashboard.example.com", &allowed));
        assert!(!origin_allowed("https://evil.example.com", &allowed));
    }
}
