use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::dtos::ErrorResponse;

/// Fixed-window request counter keyed by client IP.
#[derive(Clone)]
pub struct RateLimit {
    store: Arc<DashMap<String, RateLimitData>>,
    max_requests: usize,
    window: Duration,
}

#[derive(Debug, Clone)]
struct RateLimitData {
    count: usize,
    window_start: DateTime<Utc>,
}

impl RateLimit {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            max_requests,
            window,
        }
    }

    /// Counts one request from `ip` and reports whether it is allowed.
    fn check(&self, ip: String, now: DateTime<Utc>) -> bool {
        let mut entry = self.store.entry(ip).or_insert_with(|| RateLimitData {
            count: 0,
            window_start: now,
        });
        let data = entry.value_mut();

        if data.expired(now, self.window) {
            data.count = 0;
            data.window_start = now;
        }

        data.count += 1;
        data.count <= self.max_requests
    }

    /// Drops clients whose window has ended. Returns how many were removed.
    pub fn prune_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.store.len();
        self.store.retain(|_, data| !data.expired(now, self.window));
        before.saturating_sub(self.store.len())
    }

    pub fn tracked_clients(&self) -> usize {
        self.store.len()
    }

    /// Prunes expired windows once per window until `shutdown` fires, so
    /// the map stays bounded by the clients seen in one window.
    pub fn spawn_pruner(&self, shutdown: CancellationToken) -> JoinHandle<()> {
        let limit = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(limit.window.max(Duration::from_millis(1)));
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        let removed = limit.prune_expired(Utc::now());
                        if removed > 0 {
                            debug!(removed, remaining = limit.tracked_clients(), "pruned rate limit windows");
                        }
                    }
                }
            }
        })
    }
}

impl RateLimitData {
    fn expired(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now.signed_duration_since(self.window_start)
            .to_std()
            .is_ok_and(|elapsed| elapsed >= window)
    }
}

/// IP-based rate limiting middleware.
pub async fn rate_limit_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(rate_limit): State<RateLimit>,
    req: Request,
    next: Next,
) -> Response {
    let ip = addr.ip().to_string();
    if !rate_limit.check(ip.clone(), Utc::now()) {
        warn!(client = %ip, "rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse {
                error: "Rate limit exceeded".to_string(),
            }),
        )
            .into_response();
    }

    next.run(req).await
}
