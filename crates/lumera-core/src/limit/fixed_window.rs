//! Fixed-window request limiter.
//!
//! Counts requests per source key within non-overlapping windows of a
//! configured length. A key's counter resets only when its window expires;
//! a burst at the end of one window followed by a burst at the start of the
//! next is allowed (2×max across the boundary), which is the defining
//! trade-off of fixed-window limiting versus a sliding window.

use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;

use crate::error::{CoreError, CoreResult};

/// Message surfaced to blocked callers when none is configured.
pub const DEFAULT_LIMIT_MESSAGE: &str = "Too many requests, please try again later.";

/// Configuration for a [`FixedWindowLimiter`].
#[derive(Debug, Clone)]
pub struct LimitConfig {
    /// Window length in milliseconds. Must be non-zero.
    pub window_ms: u64,
    /// Maximum requests allowed per key within one window. Must be non-zero.
    pub max: u32,
    /// Message surfaced to blocked callers. Falls back to
    /// [`DEFAULT_LIMIT_MESSAGE`] when `None`.
    pub message: Option<String>,
}

/// Outcome of a single limiter check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LimitDecision {
    /// Request admitted. `count` is the 1-based position of this request
    /// within the key's current window.
    Allowed { count: u32, resets_at_ms: u64 },
    /// Request rejected. The key stays blocked until `resets_at_ms`.
    Blocked { message: String, resets_at_ms: u64 },
}

impl LimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, LimitDecision::Allowed { .. })
    }

    /// Epoch milliseconds at which the key's current window ends.
    pub fn resets_at_ms(&self) -> u64 {
        match self {
            LimitDecision::Allowed { resets_at_ms, .. } => *resets_at_ms,
            LimitDecision::Blocked { resets_at_ms, .. } => *resets_at_ms,
        }
    }
}

#[derive(Debug)]
struct WindowEntry {
    count: u32,
    resets_at_ms: u64,
}

/// Per-key fixed-window counter over an owned in-memory store.
///
/// Each limiter owns its store, so independent limiters (one per protected
/// route) never share counters. State lives in process memory only: it is
/// lost on restart, and horizontally scaled deployments enforce the limit
/// per instance (`max × instances` effective global cap).
///
/// Per-key check-and-increment is atomic under concurrent callers; the
/// store is a sharded-lock map, so no external locking is needed.
pub struct FixedWindowLimiter {
    config: LimitConfig,
    entries: DashMap<String, WindowEntry>,
}

impl FixedWindowLimiter {
    /// Creates a limiter. Rejects zero `window_ms` or `max`.
    pub fn new(config: LimitConfig) -> CoreResult<Self> {
        if config.window_ms == 0 {
            return Err(CoreError::InvalidLimitConfig(
                "window_ms must be non-zero".to_string(),
            ));
        }
        if config.max == 0 {
            return Err(CoreError::InvalidLimitConfig(
                "max must be non-zero".to_string(),
            ));
        }
        Ok(Self {
            config,
            entries: DashMap::new(),
        })
    }

    /// Records one request for `key` and decides whether it is admitted.
    ///
    /// Every call first sweeps the whole store, dropping entries whose
    /// window has ended, so the store shrinks across expired windows
    /// instead of growing with every key ever seen. The rejecting request
    /// still increments the counter: once a key is over the limit it stays
    /// blocked for the remainder of its window no matter how many further
    /// attempts it makes.
    pub fn check(&self, key: &str) -> LimitDecision {
        self.check_at(key, epoch_ms_now())
    }

    fn check_at(&self, key: &str, now_ms: u64) -> LimitDecision {
        self.entries.retain(|_, entry| entry.resets_at_ms >= now_ms);

        // The map guard must be dropped before touching the map again
        // (e.g. `len` below), so collect the updated counter first.
        let (count, resets_at_ms) = {
            let mut entry = self
                .entries
                .entry(key.to_string())
                .or_insert(WindowEntry {
                    count: 0,
                    resets_at_ms: now_ms + self.config.window_ms,
                });

            // Expired entries are replaced wholesale, never incremented.
            if entry.resets_at_ms < now_ms {
                *entry = WindowEntry {
                    count: 0,
                    resets_at_ms: now_ms + self.config.window_ms,
                };
            }

            entry.count += 1;
            (entry.count, entry.resets_at_ms)
        };

        if count > self.config.max {
            tracing::debug!(
                "Rate limit exceeded: key={key}, count={count}, store_size={}",
                self.entries.len()
            );
            return LimitDecision::Blocked {
                message: self
                    .config
                    .message
                    .clone()
                    .unwrap_or_else(|| DEFAULT_LIMIT_MESSAGE.to_string()),
                resets_at_ms,
            };
        }

        LimitDecision::Allowed {
            count,
            resets_at_ms,
        }
    }

    /// Number of keys currently tracked. Expired keys disappear on the
    /// next check's sweep.
    pub fn tracked_keys(&self) -> usize {
        self.entries.len()
    }
}

fn epoch_ms_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(window_ms: u64, max: u32) -> FixedWindowLimiter {
        FixedWindowLimiter::new(LimitConfig {
            window_ms,
            max,
            message: None,
        })
        .unwrap()
    }

    #[test]
    fn rejects_zero_window() {
        let result = FixedWindowLimiter::new(LimitConfig {
            window_ms: 0,
            max: 5,
            message: None,
        });
        assert!(result.is_err());
    }

    #[test]
    fn rejects_zero_max() {
        let result = FixedWindowLimiter::new(LimitConfig {
            window_ms: 1000,
            max: 0,
            message: None,
        });
        assert!(result.is_err());
    }

    #[test]
    fn counts_are_one_based_positions() {
        let limiter = limiter(60_000, 5);

        for expected in 1..=5u32 {
            match limiter.check_at("1.2.3.4", 1_000) {
                LimitDecision::Allowed { count, .. } => assert_eq!(count, expected),
                other => panic!("call {expected} should be allowed, got {other:?}"),
            }
        }
    }

    #[test]
    fn call_over_max_is_blocked() {
        let limiter = limiter(60_000, 3);

        for _ in 0..3 {
            assert!(limiter.check_at("1.2.3.4", 1_000).is_allowed());
        }
        assert!(!limiter.check_at("1.2.3.4", 1_000).is_allowed());
    }

    #[test]
    fn blocked_key_stays_blocked_for_window() {
        let limiter = limiter(60_000, 2);

        limiter.check_at("1.2.3.4", 1_000);
        limiter.check_at("1.2.3.4", 1_000);
        assert!(!limiter.check_at("1.2.3.4", 2_000).is_allowed());
        assert!(!limiter.check_at("1.2.3.4", 30_000).is_allowed());
        assert!(!limiter.check_at("1.2.3.4", 60_999).is_allowed());
    }

    #[test]
    fn window_reset_starts_fresh_count() {
        let limiter = limiter(60_000, 2);

        limiter.check_at("1.2.3.4", 1_000);
        limiter.check_at("1.2.3.4", 1_000);
        limiter.check_at("1.2.3.4", 1_000);
        assert!(!limiter.check_at("1.2.3.4", 1_000).is_allowed());

        // Past resets_at (1_000 + 60_000): fresh window regardless of how
        // far over the limit the previous one went.
        match limiter.check_at("1.2.3.4", 61_001) {
            LimitDecision::Allowed { count, .. } => assert_eq!(count, 1),
            other => panic!("expected allowed after reset, got {other:?}"),
        }
    }

    #[test]
    fn distinct_keys_do_not_influence_each_other() {
        let limiter = limiter(60_000, 2);

        limiter.check_at("1.2.3.4", 1_000);
        limiter.check_at("1.2.3.4", 1_000);
        assert!(!limiter.check_at("1.2.3.4", 1_000).is_allowed());

        match limiter.check_at("5.6.7.8", 1_000) {
            LimitDecision::Allowed { count, .. } => assert_eq!(count, 1),
            other => panic!("other key should be unaffected, got {other:?}"),
        }
    }

    #[test]
    fn interleaved_keys_count_independently() {
        let limiter = limiter(60_000, 3);

        assert!(limiter.check_at("1.2.3.4", 1_000).is_allowed());
        assert!(limiter.check_at("5.6.7.8", 1_001).is_allowed());
        assert!(limiter.check_at("1.2.3.4", 1_002).is_allowed());
        assert!(limiter.check_at("5.6.7.8", 1_003).is_allowed());
        assert!(limiter.check_at("1.2.3.4", 1_004).is_allowed());
        assert!(limiter.check_at("5.6.7.8", 1_005).is_allowed());

        // Each key is now at its limit; neither got there from the other's
        // traffic.
        assert!(!limiter.check_at("1.2.3.4", 1_006).is_allowed());
        assert!(!limiter.check_at("5.6.7.8", 1_007).is_allowed());
    }

    #[test]
    fn boundary_burst_is_allowed_across_windows() {
        let limiter = limiter(10_000, 3);

        // Three at the end of one window, three at the start of the next.
        for _ in 0..3 {
            assert!(limiter.check_at("1.2.3.4", 9_999).is_allowed());
        }
        for _ in 0..3 {
            assert!(limiter.check_at("1.2.3.4", 20_000).is_allowed());
        }
    }

    #[test]
    fn sweep_drops_expired_keys_globally() {
        let limiter = limiter(10_000, 5);

        for i in 0..20 {
            limiter.check_at(&format!("10.0.0.{i}"), 1_000);
        }
        assert_eq!(limiter.tracked_keys(), 20);

        // A single later check from a brand-new key sweeps all of them.
        limiter.check_at("192.168.0.1", 50_000);
        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[test]
    fn blocked_message_defaults_when_unconfigured() {
        let limiter = limiter(60_000, 1);

        limiter.check_at("1.2.3.4", 1_000);
        match limiter.check_at("1.2.3.4", 1_000) {
            LimitDecision::Blocked { message, .. } => {
                assert_eq!(message, DEFAULT_LIMIT_MESSAGE);
            }
            other => panic!("expected blocked, got {other:?}"),
        }
    }

    #[test]
    fn blocked_message_uses_configured_text() {
        let limiter = FixedWindowLimiter::new(LimitConfig {
            window_ms: 60_000,
            max: 1,
            message: Some("Too many login attempts.".to_string()),
        })
        .unwrap();

        limiter.check_at("1.2.3.4", 1_000);
        match limiter.check_at("1.2.3.4", 1_000) {
            LimitDecision::Blocked { message, .. } => {
                assert_eq!(message, "Too many login attempts.");
            }
            other => panic!("expected blocked, got {other:?}"),
        }
    }

    #[test]
    fn login_window_scenario() {
        // 15-minute window, 5 attempts: the documented login defaults.
        let limiter = limiter(900_000, 5);
        let start = 1_000_000;

        // Five calls within one minute each succeed with counts 1..=5.
        for i in 0..5u64 {
            match limiter.check_at("1.2.3.4", start + i * 12_000) {
                LimitDecision::Allowed { count, .. } => assert_eq!(u64::from(count), i + 1),
                other => panic!("expected allowed, got {other:?}"),
            }
        }

        // A sixth call one second after the fifth fails; the window still
        // has 851 of its 900 seconds to run.
        let sixth_at = start + 4 * 12_000 + 1_000;
        match limiter.check_at("1.2.3.4", sixth_at) {
            LimitDecision::Blocked { resets_at_ms, .. } => {
                assert_eq!(resets_at_ms, start + 900_000);
                assert_eq!(resets_at_ms - sixth_at, 851_000);
            }
            other => panic!("expected blocked, got {other:?}"),
        }

        // A seventh call 16 minutes after the first succeeds with count 1.
        match limiter.check_at("1.2.3.4", start + 960_000) {
            LimitDecision::Allowed { count, .. } => assert_eq!(count, 1),
            other => panic!("expected allowed, got {other:?}"),
        }
    }

    #[test]
    fn resets_at_is_window_start_plus_length() {
        let limiter = limiter(900_000, 5);

        let decision = limiter.check_at("1.2.3.4", 42_000);
        assert_eq!(decision.resets_at_ms(), 942_000);
    }
}
