//! Rate limiter implementation
//!
//! Sliding window limiter keyed by an arbitrary bucket string, typically a
//! route name combined with a client identifier.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};

/// Maximum number of hits allowed within a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub limit: u32,
    pub window: Duration,
}

impl RateLimit {
    pub const fn new(limit: u32, window: Duration) -> Self {
        Self { limit, window }
    }

    pub const fn per_minutes(limit: u32, minutes: u64) -> Self {
        Self::new(limit, Duration::from_secs(minutes * 60))
    }
}

/// Result of a rate limit check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    /// Whether the request is allowed
    pub allowed: bool,
    /// Remaining requests in the current window
    pub remaining: u32,
    /// Total limit for the window
    pub limit: u32,
    /// Time until a slot frees up (in seconds)
    pub reset_in_seconds: u64,
}

#[derive(Debug)]
struct Bucket {
    window: Duration,
    hits: VecDeque<Instant>,
}

impl Bucket {
    fn prune(&mut self, now: Instant) {
        while let Some(oldest) = self.hits.front() {
            if now.duration_since(*oldest) >= self.window {
                self.hits.pop_front();
            } else {
                break;
            }
        }
    }
}

/// In-process sliding window rate limiter
#[derive(Debug)]
pub struct RateLimiter {
    buckets: RwLock<HashMap<String, Bucket>>,
    cleanup_interval: Duration,
    last_cleanup: Mutex<Instant>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            buckets: RwLock::new(HashMap::new()),
            cleanup_interval: Duration::from_secs(300),
            last_cleanup: Mutex::new(Instant::now()),
        }
    }

    /// Count a hit against `bucket` if it fits within `limit`
    pub async fn check_and_record(&self, bucket: &str, limit: RateLimit) -> RateLimitResult {
        self.check_and_record_at(bucket, limit, Instant::now()).await
    }

    pub(crate) async fn check_and_record_at(
        &self,
        bucket: &str,
        limit: RateLimit,
        now: Instant,
    ) -> RateLimitResult {
        self.maybe_cleanup(now).await;

        let mut buckets = self.buckets.write().await;
        let entry = buckets.entry(bucket.to_string()).or_insert_with(|| Bucket {
            window: limit.window,
            hits: VecDeque::new(),
        });
        entry.window = limit.window;
        entry.prune(now);

        let count = entry.hits.len() as u32;

        if count >= limit.limit {
            let reset_in = entry
                .hits
                .front()
                .map(|oldest| {
                    let elapsed = now.duration_since(*oldest);
                    limit.window.saturating_sub(elapsed).as_secs().max(1)
                })
                .unwrap_or_else(|| limit.window.as_secs());

            return RateLimitResult {
                allowed: false,
                remaining: 0,
                limit: limit.limit,
                reset_in_seconds: reset_in,
            };
        }

        entry.hits.push_back(now);

        RateLimitResult {
            allowed: true,
            remaining: limit.limit.saturating_sub(count + 1),
            limit: limit.limit,
            reset_in_seconds: limit.window.as_secs(),
        }
    }

    async fn maybe_cleanup(&self, now: Instant) {
        let mut last = self.last_cleanup.lock().await;

        if now.saturating_duration_since(*last) < self.cleanup_interval {
            return;
        }
        *last = now;
        drop(last);

        let mut buckets = self.buckets.write().await;

        for bucket in buckets.values_mut() {
            bucket.prune(now);
        }

        buckets.retain(|_, bucket| !bucket.hits.is_empty());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIVE_PER_MINUTE: RateLimit = RateLimit::per_minutes(5, 1);

    #[tokio::test]
    async fn test_allows_first_request() {
        let limiter = RateLimiter::new();

        let result = limiter.check_and_record("ping:1.2.3.4", FIVE_PER_MINUTE).await;

        assert!(result.allowed);
        assert_eq!(result.remaining, 4);
        assert_eq!(result.limit, 5);
    }

    #[tokio::test]
    async fn test_blocks_over_limit() {
        let limiter = RateLimiter::new();
        let limit = RateLimit::per_minutes(2, 5);

        assert!(limiter.check_and_record("key", limit).await.allowed);
        assert!(limiter.check_and_record("key", limit).await.allowed);

        let result = limiter.check_and_record("key", limit).await;

        assert!(!result.allowed);
        assert_eq!(result.remaining, 0);
        assert!(result.reset_in_seconds > 0 && result.reset_in_seconds <= 300);
    }

    #[tokio::test]
    async fn test_window_slides() {
        let limiter = RateLimiter::new();
        let limit = RateLimit::new(1, Duration::from_secs(10));
        let start = Instant::now();

        assert!(limiter.check_and_record_at("key", limit, start).await.allowed);

        let blocked = limiter
            .check_and_record_at("key", limit, start + Duration::from_secs(4))
            .await;
        assert!(!blocked.allowed);
        assert_eq!(blocked.reset_in_seconds, 6);

        let later = limiter
            .check_and_record_at("key", limit, start + Duration::from_secs(10))
            .await;
        assert!(later.allowed);
    }

    #[tokio::test]
    async fn test_buckets_are_independent() {
        let limiter = RateLimiter::new();
        let limit = RateLimit::per_minutes(1, 1);

        limiter.check_and_record("ping:a", limit).await;

        assert!(limiter.check_and_record("ping:b", limit).await.allowed);
        assert!(!limiter.check_and_record("ping:a", limit).await.allowed);
    }

    #[tokio::test]
    async fn test_cleanup_drops_idle_buckets() {
        let limiter = RateLimiter::new();
        let limit = RateLimit::new(1, Duration::from_secs(1));
        let start = Instant::now();

        limiter.check_and_record_at("idle", limit, start).await;
        limiter
            .check_and_record_at("other", limit, start + Duration::from_secs(600))
            .await;

        let buckets = limiter.buckets.read().await;
        assert!(!buckets.contains_key("idle"));
        assert!(buckets.contains_key("other"));
    }
}
