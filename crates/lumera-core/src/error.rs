//! Error types for `lumera-core`.
//!
//! Fallible operations in the core library return [`CoreResult<T>`],
//! an alias for `Result<T, CoreError>`. Note that a rate-limit rejection
//! is not an error: the limiter reports it as an ordinary
//! [`LimitDecision`](crate::limit::LimitDecision) value.

/// Unified error type for core operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A rate limiter was constructed with an unusable configuration.
    #[error("invalid rate limit config: {0}")]
    InvalidLimitConfig(String),
}

/// Convenience alias used throughout `lumera-core`.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_limit_config_displays_detail() {
        let err = CoreError::InvalidLimitConfig("max must be non-zero".to_string());
        assert_eq!(
            err.to_string(),
            "invalid rate limit config: max must be non-zero"
        );
    }

    #[test]
    fn error_is_debug() {
        let err = CoreError::InvalidLimitConfig("window_ms must be non-zero".to_string());
        assert!(format!("{err:?}").contains("InvalidLimitConfig"));
    }
}
