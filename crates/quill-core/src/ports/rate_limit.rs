//! Attempt throttling port.

use std::time::Duration;

use async_trait::async_trait;

/// Throttle for credential attempts, keyed by caller-chosen strings.
#[async_trait]
pub trait AttemptLimiter: Send + Sync {
    /// Record an attempt for `key` and report whether it may proceed.
    async fn check(&self, key: &str) -> Result<Attempt, RateLimitError>;
}

/// Outcome of an attempt check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Allowed,
    Throttled { retry_after: Duration },
}

/// Rate limit errors.
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Backend error: {0}")]
    Backend(String),
}
