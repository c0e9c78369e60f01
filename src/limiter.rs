// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter keyed by (client IP, route path).
//!
//! Each key owns a bucket of recent request timestamps. On every check the
//! bucket is purged of timestamps older than the window; if the remaining
//! count has reached the maximum the request is rejected, otherwise the
//! current instant is recorded and the request admitted. Two paths hit by the
//! same client are tracked independently; this is deliberate, not a global
//! per-client budget.
//!
//! State is process-local: it is not shared across instances and is lost on
//! restart. Buckets are never evicted, so the map grows with the number of
//! distinct (IP, path) keys seen over the process lifetime.

use crate::config::RateLimitConfig;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Result of a rate limit check.
#[derive(Debug, Clone)]
pub enum RateLimitResult {
    /// Request is admitted
    Allowed {
        /// Remaining requests in the current window for this key
        remaining: u32,
    },
    /// Request is rejected
    Limited {
        /// Time until the oldest recorded request ages out of the window
        retry_after: Duration,
    },
}

/// Thread-safe fixed-window rate limiter.
///
/// Constructed once at process start and shared through `AppState`; the
/// check-and-record step runs under a single write lock so it is atomic with
/// respect to concurrent requests on the same key.
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    buckets: Arc<RwLock<HashMap<(IpAddr, String), Vec<Instant>>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            max_requests: config.max_requests as usize,
            window: config.window_duration(),
            buckets: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Check the limit for one (IP, path) key and record the request if
    /// admitted.
    pub async fn check(&self, ip: IpAddr, path: &str) -> RateLimitResult {
        self.check_at(ip, path, Instant::now()).await
    }

    async fn check_at(&self, ip: IpAddr, path: &str, now: Instant) -> RateLimitResult {
        let mut buckets = self.buckets.write().await;
        let stamps = buckets.entry((ip, path.to_string())).or_default();

        stamps.retain(|t| now.duration_since(*t) < self.window);

        if stamps.len() >= self.max_requests {
            // Admission reopens once the oldest surviving timestamp ages out.
            let oldest = stamps[0];
            let retry_after = self.window.saturating_sub(now.duration_since(oldest));
            debug!(%ip, path, ?retry_after, "rate limit exceeded");
            RateLimitResult::Limited { retry_after }
        } else {
            stamps.push(now);
            let remaining = (self.max_requests - stamps.len()) as u32;
            RateLimitResult::Allowed { remaining }
        }
    }
}
