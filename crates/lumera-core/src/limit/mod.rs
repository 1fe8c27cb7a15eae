//! Request rate limiting.
//!
//! [`FixedWindowLimiter`] is the mechanism that guards the login endpoint
//! against brute-force attempts; [`client_key`] decides which bucket an
//! inbound request counts against.

pub mod fixed_window;
pub mod key;

pub use fixed_window::{FixedWindowLimiter, LimitConfig, LimitDecision, DEFAULT_LIMIT_MESSAGE};
pub use key::{client_key, UNKNOWN_CLIENT_KEY};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headerless_callers_share_one_counter() {
        let limiter = FixedWindowLimiter::new(LimitConfig {
            window_ms: 60_000,
            max: 2,
            message: None,
        })
        .unwrap();

        assert!(limiter.check(&client_key(None, None)).is_allowed());
        assert!(limiter.check(&client_key(Some(""), None)).is_allowed());
        assert!(!limiter.check(&client_key(None, Some("  "))).is_allowed());
    }
}
