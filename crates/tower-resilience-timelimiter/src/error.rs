//! Error types for time limiter.

use std::fmt;
use std::time::Duration;
use tower_resilience_core::ResilienceError;

/// Errors that can occur in the time limiter.
#[derive(Debug, Clone)]
pub enum TimeLimiterError<E> {
    /// The inner service did not complete within the configured duration.
    MaxDurationExceeded {
        /// The timeout that was exceeded.
        timeout: Duration,
    },
    /// The inner service returned an error.
    Inner(E),
}

impl<E: fmt::Display> fmt::Display for TimeLimiterError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeLimiterError::MaxDurationExceeded { timeout } => {
                write!(f, "call exceeded {:?}", timeout)
            }
            TimeLimiterError::Inner(e) => write!(f, "inner service error: {}", e),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for TimeLimiterError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TimeLimiterError::MaxDurationExceeded { .. } => None,
            TimeLimiterError::Inner(e) => Some(e),
        }
    }
}

impl<E> TimeLimiterError<E> {
    /// Returns true if this is a timeout error.
    pub fn is_max_duration_exceeded(&self) -> bool {
        matches!(self, TimeLimiterError::MaxDurationExceeded { .. })
    }

    /// Converts this error into the inner error, if any.
    pub fn into_inner(self) -> Option<E> {
        match self {
            TimeLimiterError::MaxDurationExceeded { .. } => None,
            TimeLimiterError::Inner(e) => Some(e),
        }
    }
}

impl<E> From<TimeLimiterError<E>> for ResilienceError<E> {
    fn from(err: TimeLimiterError<E>) -> Self {
        match err {
            TimeLimiterError::MaxDurationExceeded { .. } => {
                ResilienceError::Timeout { layer: "time_limiter" }
            }
            TimeLimiterError::Inner(e) => ResilienceError::Application(e),
        }
    }
}
