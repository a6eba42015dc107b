use thiserror::Error;
use tower_resilience_core::ResilienceError;

/// Errors returned by the `FeatureToggle` service.
#[derive(Debug, Error)]
pub enum FeatureToggleError<E> {
    /// The feature is disabled (flag off, or the predicate rejected the call).
    #[error("feature is disabled")]
    Disabled,

    /// An error returned by the inner service.
    #[error("inner service error: {0}")]
    Inner(E),
}

impl<E> FeatureToggleError<E> {
    /// Returns true if the error indicates the feature is disabled.
    pub fn is_disabled(&self) -> bool {
        matches!(self, FeatureToggleError::Disabled)
    }

    /// Returns the inner error if present.
    pub fn into_inner(self) -> Option<E> {
        match self {
            FeatureToggleError::Inner(e) => Some(e),
            _ => None,
        }
    }
}

impl<E> From<E> for FeatureToggleError<E> {
    fn from(err: E) -> Self {
        FeatureToggleError::Inner(err)
    }
}

impl<E> From<FeatureToggleError<E>> for ResilienceError<E> {
    fn from(err: FeatureToggleError<E>) -> Self {
        match err {
            FeatureToggleError::Disabled => ResilienceError::FeatureDisabled { name: None },
            FeatureToggleError::Inner(e) => ResilienceError::Application(e),
        }
    }
}
