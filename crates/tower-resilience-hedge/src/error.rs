//! Error types for the hedging middleware.

use std::fmt;
use std::time::Duration;
use tower_resilience_core::ResilienceError;

/// Error type for the hedging service.
#[derive(Debug, Clone)]
pub enum HedgeError<E> {
    /// Every launched attempt failed. Carries the number of attempts made
    /// and the error from whichever attempt's failure was observed last.
    AllFailed { attempts: usize, last_error: E },

    /// The configured overall timeout elapsed before any attempt succeeded.
    Timeout { timeout: Duration },

    /// Error from the inner service, surfaced without hedging involvement
    /// (e.g. `poll_ready` failure).
    Inner(E),
}

impl<E: fmt::Display> fmt::Display for HedgeError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HedgeError::AllFailed { attempts, last_error } => {
                write!(f, "all {} hedged attempts failed: {}", attempts, last_error)
            }
            HedgeError::Timeout { timeout } => {
                write!(f, "hedge timed out after {:?}", timeout)
            }
            HedgeError::Inner(e) => write!(f, "{}", e),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for HedgeError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HedgeError::AllFailed { last_error, .. } => Some(last_error),
            HedgeError::Timeout { .. } => None,
            HedgeError::Inner(e) => Some(e),
        }
    }
}

impl<E> HedgeError<E> {
    /// Returns `true` if every hedged attempt failed.
    pub fn is_all_failed(&self) -> bool {
        matches!(self, HedgeError::AllFailed { .. })
    }

    /// Returns `true` if the overall hedge timeout elapsed first.
    pub fn is_timeout(&self) -> bool {
        matches!(self, HedgeError::Timeout { .. })
    }

    /// Returns `true` if this is an inner service error.
    pub fn is_inner(&self) -> bool {
        matches!(self, HedgeError::Inner(_))
    }
}

impl<E> From<HedgeError<E>> for ResilienceError<E> {
    fn from(err: HedgeError<E>) -> Self {
        match err {
            HedgeError::AllFailed { attempts, .. } => ResilienceError::HedgeAllFailed { attempts },
            HedgeError::Timeout { timeout } => ResilienceError::HedgeTimeout { timeout },
            HedgeError::Inner(e) => ResilienceError::Application(e),
        }
    }
}
