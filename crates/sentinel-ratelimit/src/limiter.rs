//! The fixed-window rate limiter.

use chrono::{DateTime, Duration, Utc};
use sentinel_core::{Timestamp, UserId};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::{ClassLimit, RateLimits};

/// Counter for one open window on one key.
#[derive(Debug, Clone, Copy)]
struct FixedWindow {
    count: u32,
    window_start: DateTime<Utc>,
    limit: ClassLimit,
}

impl FixedWindow {
    fn open(limit: ClassLimit, now: DateTime<Utc>) -> Self {
        Self {
            count: 0,
            window_start: now,
            limit,
        }
    }

    /// Count one request against the window, resetting it first if it
    /// has expired.
    fn consume(&mut self, now: DateTime<Utc>) -> RateLimitDecision {
        if now - self.window_start >= self.limit.window() {
            self.count = 0;
            self.window_start = now;
        }

        let reset_at = Timestamp(self.window_start + self.limit.window());
        if self.count >= self.limit.requests {
            return RateLimitDecision {
                allowed: false,
                remaining: 0,
                reset_at,
            };
        }

        self.count = self.count.saturating_add(1);
        RateLimitDecision {
            allowed: true,
            remaining: self.limit.requests.saturating_sub(self.count),
            reset_at,
        }
    }
}

/// Outcome of a [`RateLimiter::consume`] call.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Requests left in the open window.
    pub remaining: u32,
    /// When the open window expires and the counter resets.
    pub reset_at: Timestamp,
}

impl RateLimitDecision {
    /// Time until the window resets, if the request was denied.
    #[must_use]
    pub fn retry_after(&self, now: Timestamp) -> Option<Duration> {
        if self.allowed {
            return None;
        }
        Some(self.reset_at.0 - now.0)
    }
}

/// Fixed-window rate limiter over `(user, endpoint class)` keys.
///
/// The counter map is guarded by a single async lock; each consume is
/// an atomic read-modify-write, so concurrent callers on the same key
/// cannot both claim the last slot.
#[derive(Debug)]
pub struct RateLimiter {
    limits: RateLimits,
    counters: RwLock<HashMap<String, FixedWindow>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimits::default())
    }
}

impl RateLimiter {
    /// Create a limiter with the given budget table.
    #[must_use]
    pub fn new(limits: RateLimits) -> Self {
        Self {
            limits,
            counters: RwLock::new(HashMap::new()),
        }
    }

    /// The storage key for a `(user, endpoint class)` pair.
    ///
    /// Namespaced and colon-separated; distinct users or classes never
    /// collide because class names come from a closed table.
    #[must_use]
    pub fn rate_limit_key(user_id: &UserId, endpoint_class: &str) -> String {
        format!("ratelimit:{user_id}:{endpoint_class}")
    }

    /// Count one request for `user` against `endpoint_class`.
    ///
    /// Unknown classes use the `default` budget.
    pub async fn consume(&self, user_id: &UserId, endpoint_class: &str) -> RateLimitDecision {
        self.consume_at(user_id, endpoint_class, Timestamp::now()).await
    }

    /// [`consume`](Self::consume) with an explicit clock.
    ///
    /// The limiter itself never interprets `now`; callers that carry
    /// their own notion of request time (tests, replayed traffic) pass
    /// it here.
    pub async fn consume_at(
        &self,
        user_id: &UserId,
        endpoint_class: &str,
        now: Timestamp,
    ) -> RateLimitDecision {
        let key = Self::rate_limit_key(user_id, endpoint_class);
        let limit = self.limits.limit_for(endpoint_class);

        let mut counters = self.counters.write().await;
        let window = counters
            .entry(key)
            .or_insert_with(|| FixedWindow::open(limit, now.0));
        let decision = window.consume(now.0);

        if !decision.allowed {
            debug!(user = %user_id, class = endpoint_class, "request rate limited");
        }
        decision
    }

    /// Requests left for a key without consuming one.
    pub async fn remaining(&self, user_id: &UserId, endpoint_class: &str) -> u32 {
        let key = Self::rate_limit_key(user_id, endpoint_class);
        let counters = self.counters.read().await;
        counters.get(&key).map_or(
            self.limits.limit_for(endpoint_class).requests,
            |window| window.limit.requests.saturating_sub(window.count),
        )
    }

    /// Drop the open window for one key.
    pub async fn reset(&self, user_id: &UserId, endpoint_class: &str) {
        let key = Self::rate_limit_key(user_id, endpoint_class);
        self.counters.write().await.remove(&key);
    }

    /// Drop every open window.
    pub async fn reset_all(&self) {
        self.counters.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(offset_ms: i64) -> Timestamp {
        let base = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        Timestamp(base + Duration::milliseconds(offset_ms))
    }

    fn small_limits() -> RateLimits {
        RateLimits {
            default: ClassLimit::new(3, 1_000),
            classes: HashMap::from([("chat".to_owned(), ClassLimit::new(2, 1_000))]),
        }
    }

    #[tokio::test]
    async fn test_denies_over_budget_within_window() {
        let limiter = RateLimiter::new(small_limits());
        let alice = UserId::new("alice");

        for _ in 0..3 {
            assert!(limiter.consume_at(&alice, "default", at(0)).await.allowed);
        }
        let fourth = limiter.consume_at(&alice, "default", at(500)).await;
        assert!(!fourth.allowed);
        assert_eq!(fourth.remaining, 0);
    }

    #[tokio::test]
    async fn test_window_reset_restores_budget() {
        let limiter = RateLimiter::new(small_limits());
        let alice = UserId::new("alice");

        for _ in 0..3 {
            limiter.consume_at(&alice, "default", at(0)).await;
        }
        assert!(!limiter.consume_at(&alice, "default", at(999)).await.allowed);

        // windowMs elapsed since the window opened: counter resets.
        let fresh = limiter.consume_at(&alice, "default", at(1_000)).await;
        assert!(fresh.allowed);
        assert_eq!(fresh.remaining, 2);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = RateLimiter::new(small_limits());
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");

        for _ in 0..3 {
            limiter.consume_at(&alice, "default", at(0)).await;
        }
        assert!(!limiter.consume_at(&alice, "default", at(0)).await.allowed);

        // Another user, and another class for the same user, still have
        // their full budgets.
        assert!(limiter.consume_at(&bob, "default", at(0)).await.allowed);
        assert!(limiter.consume_at(&alice, "chat", at(0)).await.allowed);
    }

    #[tokio::test]
    async fn test_unknown_class_uses_default_budget() {
        let limiter = RateLimiter::new(small_limits());
        let alice = UserId::new("alice");

        for _ in 0..3 {
            assert!(limiter.consume_at(&alice, "mystery", at(0)).await.allowed);
        }
        assert!(!limiter.consume_at(&alice, "mystery", at(0)).await.allowed);
    }

    #[tokio::test]
    async fn test_named_class_uses_its_budget() {
        let limiter = RateLimiter::new(small_limits());
        let alice = UserId::new("alice");

        assert!(limiter.consume_at(&alice, "chat", at(0)).await.allowed);
        assert!(limiter.consume_at(&alice, "chat", at(0)).await.allowed);
        assert!(!limiter.consume_at(&alice, "chat", at(0)).await.allowed);
    }

    #[tokio::test]
    async fn test_decision_reset_at_and_retry_after() {
        let limiter = RateLimiter::new(small_limits());
        let alice = UserId::new("alice");

        let first = limiter.consume_at(&alice, "default", at(0)).await;
        assert_eq!(first.reset_at, at(1_000));
        assert!(first.retry_after(at(0)).is_none());

        for _ in 0..2 {
            limiter.consume_at(&alice, "default", at(0)).await;
        }
        let denied = limiter.consume_at(&alice, "default", at(400)).await;
        assert!(!denied.allowed);
        assert_eq!(denied.retry_after(at(400)), Some(Duration::milliseconds(600)));
    }

    #[tokio::test]
    async fn test_remaining_without_consuming() {
        let limiter = RateLimiter::new(small_limits());
        let alice = UserId::new("alice");

        assert_eq!(limiter.remaining(&alice, "default").await, 3);
        limiter.consume_at(&alice, "default", at(0)).await;
        assert_eq!(limiter.remaining(&alice, "default").await, 2);
    }

    #[tokio::test]
    async fn test_reset_clears_one_key() {
        let limiter = RateLimiter::new(small_limits());
        let alice = UserId::new("alice");

        for _ in 0..3 {
            limiter.consume_at(&alice, "default", at(0)).await;
        }
        limiter.reset(&alice, "default").await;
        assert!(limiter.consume_at(&alice, "default", at(0)).await.allowed);
    }

    #[test]
    fn test_key_format_never_collides_across_users() {
        let key_a = RateLimiter::rate_limit_key(&UserId::new("alice"), "chat");
        let key_b = RateLimiter::rate_limit_key(&UserId::new("bob"), "chat");
        let key_c = RateLimiter::rate_limit_key(&UserId::new("alice"), "shell");

        assert_eq!(key_a, "ratelimit:alice:chat");
        assert_ne!(key_a, key_b);
        assert_ne!(key_a, key_c);
    }

    #[tokio::test]
    async fn test_concurrent_consumers_never_exceed_budget() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicU32, Ordering};

        let limiter = Arc::new(RateLimiter::new(RateLimits {
            default: ClassLimit::new(10, 60_000),
            classes: HashMap::new(),
        }));
        let allowed = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..40 {
            let limiter = Arc::clone(&limiter);
            let allowed = Arc::clone(&allowed);
            handles.push(tokio::spawn(async move {
                let decision = limiter.consume(&UserId::new("alice"), "default").await;
                if decision.allowed {
                    allowed.fetch_add(1, Ordering::SeqCst);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(allowed.load(Ordering::SeqCst), 10);
    }
}
