use std::fmt;
use tower_resilience_core::ResilienceError;

/// Errors that can occur when using the rate limiter.
#[derive(Debug, Clone)]
pub enum RateLimiterError {
    /// The token bucket had no tokens available. `retry_after_ms` is the
    /// calculator's recommended wait, in milliseconds.
    RateLimitExceeded { retry_after_ms: f64 },
}

impl RateLimiterError {
    /// The recommended wait before retrying, in milliseconds.
    pub fn retry_after_ms(&self) -> f64 {
        match self {
            RateLimiterError::RateLimitExceeded { retry_after_ms } => *retry_after_ms,
        }
    }
}

impl fmt::Display for RateLimiterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateLimiterError::RateLimitExceeded { retry_after_ms } => {
                write!(f, "rate limit exceeded, retry after {retry_after_ms}ms")
            }
        }
    }
}

impl std::error::Error for RateLimiterError {}

impl<E> From<RateLimiterError> for ResilienceError<E> {
    fn from(err: RateLimiterError) -> Self {
        let RateLimiterError::RateLimitExceeded { retry_after_ms } = err;
        ResilienceError::RateLimited {
            retry_after: Some(std::time::Duration::from_secs_f64(retry_after_ms / 1000.0)),
        }
    }
}
