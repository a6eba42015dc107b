//! Admission gate in front of the retry loop.
//!
//! Unlike a bare retry-exhaustion counter, this gates every attempt --
//! including the first -- through a shared [`TokenBucket`]. An admission
//! failure counts as an attempt failure attributable to rate limiting: it
//! flows through the same exhaustion/backoff decision as a real service-call
//! error, without ever calling the inner service.

use std::sync::Arc;
use tower_resilience_ratelimiter::bucket::{EmptyBucket, TokenBucket};

/// Wraps a [`TokenBucket`] with a conversion from [`EmptyBucket`] into the
/// service's error type.
///
/// The conversion is supplied by the caller rather than required via a
/// `From` bound, so adding an admission limiter never changes the trait
/// bounds on [`crate::Retry`]'s `Service` impl.
pub struct AdmissionLimiter<E> {
    pub(crate) bucket: Arc<TokenBucket>,
    pub(crate) to_error: Arc<dyn Fn(EmptyBucket) -> E + Send + Sync>,
}

impl<E> Clone for AdmissionLimiter<E> {
    fn clone(&self) -> Self {
        Self {
            bucket: Arc::clone(&self.bucket),
            to_error: Arc::clone(&self.to_error),
        }
    }
}

impl<E> AdmissionLimiter<E> {
    /// Creates an admission limiter backed by `bucket`, converting a denied
    /// admission into `E` via `to_error`.
    pub fn new(
        bucket: Arc<TokenBucket>,
        to_error: impl Fn(EmptyBucket) -> E + Send + Sync + 'static,
    ) -> Self {
        Self {
            bucket,
            to_error: Arc::new(to_error),
        }
    }

    pub(crate) fn admit(&self) -> Result<(), E> {
        self.bucket.take().map(|_| ()).map_err(|empty| (self.to_error)(empty))
    }
}
