use thiserror::Error;
use tower_resilience_core::ResilienceError;

/// Errors returned by the `CircuitBreaker` service.
#[derive(Debug, Error)]
pub enum CircuitBreakerError<E> {
    /// The breaker is in the Failing state; calls are rejected without
    /// invoking the inner service.
    #[error("circuit is failing; call not permitted")]
    BreakerFailing,

    /// An error returned by the inner service.
    #[error("inner service error: {0}")]
    Inner(E),
}

impl<E> CircuitBreakerError<E> {
    /// Returns true if the error indicates the breaker is failing (rejecting calls).
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, CircuitBreakerError::BreakerFailing)
    }

    /// Returns the inner error if present.
    pub fn into_inner(self) -> Option<E> {
        match self {
            CircuitBreakerError::Inner(e) => Some(e),
            _ => None,
        }
    }
}

impl<E> From<E> for CircuitBreakerError<E> {
    fn from(err: E) -> Self {
        CircuitBreakerError::Inner(err)
    }
}

impl<E> From<CircuitBreakerError<E>> for ResilienceError<E> {
    fn from(err: CircuitBreakerError<E>) -> Self {
        match err {
            CircuitBreakerError::BreakerFailing => ResilienceError::CircuitOpen { name: None },
            CircuitBreakerError::Inner(e) => ResilienceError::Application(e),
        }
    }
}
