//! Adaptive rate limiting middleware for Tower services.
//!
//! Built around a continuous-refill [`bucket::TokenBucket`] rather than a
//! fixed or sliding window, paired with a pluggable
//! [`retry_after::RetryAfterCalculator`] that turns bucket state into a
//! caller-facing wait hint. The default calculator,
//! [`backpressure::BackpressureCalculator`], blends a latency-outlier
//! signal with a latency-gradient signal so the advertised retry time
//! reflects actual downstream health, not just the bucket's own math.
//!
//! # Examples
//!
//! ```
//! use tower_resilience_ratelimiter::RateLimiterLayer;
//! use tower::ServiceBuilder;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let rate_limiter = RateLimiterLayer::builder()
//!     .limit_for_period(100)
//!     .refresh_period(Duration::from_secs(1))
//!     .on_rejected(|client_id, retry_after_ms| {
//!         println!("rejected {:?}, retry after {}ms", client_id, retry_after_ms);
//!     })
//!     .build();
//!
//! let service = ServiceBuilder::new()
//!     .layer(rate_limiter)
//!     .service(tower::service_fn(|req: String| async move {
//!         Ok::<_, std::io::Error>(format!("Response: {}", req))
//!     }));
//! # Ok(())
//! # }
//! ```

pub mod backpressure;
pub mod bucket;
pub mod client_id;
mod config;
mod error;
mod events;
mod layer;
mod limiter;
pub mod retry_after;

pub use config::{RateLimiterConfig, RateLimiterConfigBuilder};
pub use error::RateLimiterError;
pub use events::RateLimiterEvent;
pub use layer::RateLimiterLayer;
pub use limiter::SharedRateLimiter;

use futures::future::BoxFuture;
use std::task::{Context, Poll};
use tower::Service;

/// A Tower [`Service`] that applies rate limiting to each request. Optional
/// per-request client-id extraction is supplied via [`RateLimiter::with_client_id_fn`];
/// without it, every request shares the same global bucket window.
pub struct RateLimiter<S, Req> {
    inner: S,
    limiter: SharedRateLimiter,
    client_id_fn: Option<std::sync::Arc<dyn Fn(&Req) -> Option<String> + Send + Sync>>,
}

impl<S, Req> RateLimiter<S, Req> {
    pub(crate) fn from_shared(inner: S, limiter: SharedRateLimiter) -> Self {
        Self {
            inner,
            limiter,
            client_id_fn: None,
        }
    }

    /// Attaches a client-id extractor invoked on each request; see
    /// [`client_id::extract_client_id`] for the default HTTP precedence
    /// order when `Req` is an HTTP-like type.
    pub fn with_client_id_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&Req) -> Option<String> + Send + Sync + 'static,
    {
        self.client_id_fn = Some(std::sync::Arc::new(f));
        self
    }

    /// The bare rate limiter handle backing this service.
    pub fn handle(&self) -> SharedRateLimiter {
        self.limiter.clone()
    }
}

impl<S, Req> Clone for RateLimiter<S, Req>
where
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            limiter: self.limiter.clone(),
            client_id_fn: self.client_id_fn.clone(),
        }
    }
}

impl<S, Req> Service<Req> for RateLimiter<S, Req>
where
    S: Service<Req> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    Req: Send + 'static,
{
    type Response = S::Response;
    type Error = RateLimiterError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner
            .poll_ready(cx)
            .map_err(|_| RateLimiterError::RateLimitExceeded { retry_after_ms: 0.0 })
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let client_id = self.client_id_fn.as_ref().and_then(|f| f(&req));
        let limiter = self.limiter.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            match limiter.acquire(client_id.as_deref()) {
                Ok(_event) => inner
                    .call(req)
                    .await
                    .map_err(|_| RateLimiterError::RateLimitExceeded { retry_after_ms: 0.0 }),
                Err(events::RateLimiterEvent::Rejected { retry_after_ms, .. }) => {
                    Err(RateLimiterError::RateLimitExceeded { retry_after_ms })
                }
                Err(_) => unreachable!("acquire only errs with Rejected"),
            }
        })
    }
}
