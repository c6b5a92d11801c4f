//! Keyed refilling token bucket.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Bucket {
    count: u32,
    refilled_at: Instant,
}

/// Token bucket map keyed by an arbitrary hashable key (client IP, user id).
///
/// Each key gets its own bucket seeded with `max` tokens on first access.
/// Tokens refill lazily when [`consume`](Self::consume) runs: one token per
/// full `refill_interval` elapsed since the last refill, capped at `max`.
/// The count never leaves `0..=max`.
///
/// Buckets are never evicted; the key set grows with distinct keys for the
/// process lifetime.
#[derive(Debug)]
pub struct RefillingTokenBucket<K> {
    max: u32,
    refill_interval: Duration,
    buckets: Mutex<HashMap<K, Bucket>>,
}

impl<K: Eq + Hash> RefillingTokenBucket<K> {
    /// Create a bucket map.
    ///
    /// # Panics
    /// Panics if `max` is zero or `refill_interval` is zero.
    #[must_use]
    pub fn new(max: u32, refill_interval: Duration) -> Self {
        assert!(max > 0, "max tokens must be positive");
        assert!(
            !refill_interval.is_zero(),
            "refill interval must be positive"
        );
        Self {
            max,
            refill_interval,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Take `cost` tokens (>= 1) from the key's bucket.
    ///
    /// Returns `true` and deducts when enough tokens are available after the
    /// lazy refill, `false` leaving the bucket unchanged otherwise. Never
    /// fails: a denied consume is a regular outcome, not an error.
    pub fn consume(&self, key: K, cost: u32) -> bool {
        self.consume_at(key, cost, Instant::now())
    }

    fn consume_at(&self, key: K, cost: u32, now: Instant) -> bool {
        let mut buckets = self
            .buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let bucket = buckets.entry(key).or_insert(Bucket {
            count: self.max,
            refilled_at: now,
        });

        // Instant::duration_since saturates to zero if refilled_at is ahead.
        let elapsed = now.duration_since(bucket.refilled_at);
        let intervals = elapsed.as_nanos() / self.refill_interval.as_nanos();
        if intervals > 0 {
            let refill = u32::try_from(intervals).unwrap_or(u32::MAX);
            bucket.count = bucket.count.saturating_add(refill).min(self.max);
            bucket.refilled_at = now;
        }

        if bucket.count < cost {
            return false;
        }
        bucket.count -= cost;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_secs(1);

    #[test]
    fn first_access_starts_full() {
        let bucket = RefillingTokenBucket::new(5, INTERVAL);
        let now = Instant::now();
        for _ in 0..5 {
            assert!(bucket.consume_at("key", 1, now));
        }
        assert!(!bucket.consume_at("key", 1, now));
    }

    #[test]
    fn first_access_cost_above_max_is_denied() {
        let bucket = RefillingTokenBucket::new(3, INTERVAL);
        let now = Instant::now();
        assert!(!bucket.consume_at("key", 4, now));
        // The seeded bucket is still intact.
        assert!(bucket.consume_at("key", 3, now));
    }

    #[test]
    fn denied_consume_leaves_count_unchanged() {
        let bucket = RefillingTokenBucket::new(2, INTERVAL);
        let start = Instant::now();
        assert!(bucket.consume_at("key", 2, start));
        assert!(!bucket.consume_at("key", 1, start));
        // One interval refills exactly one token, so the earlier denial
        // cannot have gone below zero.
        assert!(bucket.consume_at("key", 1, start + INTERVAL));
        assert!(!bucket.consume_at("key", 1, start + INTERVAL));
    }

    #[test]
    fn refill_after_full_window_restores_max() {
        let bucket = RefillingTokenBucket::new(100, INTERVAL);
        let start = Instant::now();
        for _ in 0..100 {
            assert!(bucket.consume_at("key", 1, start));
        }
        assert!(!bucket.consume_at("key", 1, start));

        // 100 seconds later the bucket holds 100 tokens again, no more.
        let later = start + Duration::from_secs(100);
        for _ in 0..100 {
            assert!(bucket.consume_at("key", 1, later));
        }
        assert!(!bucket.consume_at("key", 1, later));
    }

    #[test]
    fn no_elapsed_time_refills_nothing() {
        let bucket = RefillingTokenBucket::new(100, INTERVAL);
        let start = Instant::now();
        for _ in 0..100 {
            assert!(bucket.consume_at("key", 1, start));
        }
        assert!(!bucket.consume_at("key", 1, start));
    }

    #[test]
    fn refill_caps_at_max() {
        let bucket = RefillingTokenBucket::new(3, INTERVAL);
        let start = Instant::now();
        assert!(bucket.consume_at("key", 1, start));
        // A very long idle period cannot push the count above max.
        let later = start + Duration::from_secs(10_000);
        assert!(bucket.consume_at("key", 3, later));
        assert!(!bucket.consume_at("key", 1, later));
    }

    #[test]
    fn partial_interval_adds_nothing() {
        let bucket = RefillingTokenBucket::new(1, INTERVAL);
        let start = Instant::now();
        assert!(bucket.consume_at("key", 1, start));
        assert!(!bucket.consume_at("key", 1, start + Duration::from_millis(999)));
        assert!(bucket.consume_at("key", 1, start + Duration::from_secs(1)));
    }

    #[test]
    fn keys_are_independent() {
        let bucket = RefillingTokenBucket::new(1, INTERVAL);
        let now = Instant::now();
        assert!(bucket.consume_at("a", 1, now));
        assert!(bucket.consume_at("b", 1, now));
        assert!(!bucket.consume_at("a", 1, now));
    }

    #[test]
    fn refilled_at_only_advances_on_refill() {
        let bucket = RefillingTokenBucket::new(10, INTERVAL);
        let start = Instant::now();
        assert!(bucket.consume_at("key", 10, start));
        // 900ms later: no refill, and the window anchor must not move.
        assert!(!bucket.consume_at("key", 1, start + Duration::from_millis(900)));
        // 1.1s after the anchor a full interval has elapsed.
        assert!(bucket.consume_at("key", 1, start + Duration::from_millis(1_100)));
    }

    #[test]
    fn shared_across_threads() {
        let bucket = std::sync::Arc::new(RefillingTokenBucket::new(8, INTERVAL));
        // Fixed instant so no refill can sneak in on a slow runner.
        let now = Instant::now();
        let mut handles = Vec::new();
        for _ in 0..4 {
            let bucket = bucket.clone();
            handles.push(std::thread::spawn(move || {
                let mut granted = 0u32;
                for _ in 0..4 {
                    if bucket.consume_at("shared", 1, now) {
                        granted += 1;
                    }
                }
                granted
            }));
        }
        let granted: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        // 16 attempts against 8 tokens: exactly 8 may succeed.
        assert_eq!(granted, 8);
    }
}
