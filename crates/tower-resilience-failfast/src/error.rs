use thiserror::Error;
use tower_resilience_core::ResilienceError;

/// Errors returned by the `FailFast` service.
#[derive(Debug, Error)]
pub enum FailFastError<E> {
    /// The gate is open; calls are rejected without invoking the inner service.
    #[error("fail-fast gate is open; call not permitted")]
    Open,

    /// An error returned by the inner service.
    #[error("inner service error: {0}")]
    Inner(E),
}

impl<E> FailFastError<E> {
    /// Returns true if the error indicates the gate is open.
    pub fn is_open(&self) -> bool {
        matches!(self, FailFastError::Open)
    }

    /// Returns the inner error if present.
    pub fn into_inner(self) -> Option<E> {
        match self {
            FailFastError::Inner(e) => Some(e),
            _ => None,
        }
    }
}

impl<E> From<E> for FailFastError<E> {
    fn from(err: E) -> Self {
        FailFastError::Inner(err)
    }
}

impl<E> From<FailFastError<E>> for ResilienceError<E> {
    fn from(err: FailFastError<E>) -> Self {
        match err {
            FailFastError::Open => ResilienceError::FailFastOpen { name: None },
            FailFastError::Inner(e) => ResilienceError::Application(e),
        }
    }
}
