use crate::config::{RateLimiterConfig, RateLimiterConfigBuilder};
use crate::limiter::SharedRateLimiter;
use crate::RateLimiter;
use std::sync::Arc;
use tower::Layer;
use tower_resilience_core::clock::Clock;

/// A Tower [`Layer`] that applies rate limiting to a service.
///
/// # Examples
///
/// ```
/// use tower_resilience_ratelimiter::RateLimiterLayer;
/// use tower::ServiceBuilder;
/// use std::time::Duration;
///
/// # async fn example() {
/// let rate_limiter = RateLimiterLayer::builder()
///     .limit_for_period(100)
///     .refresh_period(Duration::from_secs(1))
///     .build();
///
/// let service = ServiceBuilder::new()
///     .layer(rate_limiter)
///     .service(my_service());
/// # }
/// # fn my_service() -> impl tower::Service<String, Response = String, Error = std::io::Error> {
/// #     tower::service_fn(|req: String| async move { Ok::<_, std::io::Error>(req) })
/// # }
/// ```
#[derive(Clone)]
pub struct RateLimiterLayer {
    limiter: SharedRateLimiter,
}

impl RateLimiterLayer {
    /// Starts building a [`RateLimiterLayer`] with the default configuration.
    pub fn builder() -> RateLimiterConfigBuilder {
        RateLimiterConfigBuilder::new()
    }

    /// Creates a new `RateLimiterLayer` from the given configuration, using
    /// the production [`TokioClock`].
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            limiter: SharedRateLimiter::new(&config),
        }
    }

    /// Creates a new `RateLimiterLayer` driven by a custom [`Clock`] —
    /// primarily for deterministic tests.
    pub fn with_clock(config: RateLimiterConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            limiter: SharedRateLimiter::with_clock(&config, clock),
        }
    }

    /// The bare rate limiter handle backing this layer, for callers that
    /// want to call `acquire` directly (or register it with the control
    /// plane) outside of the tower stack.
    pub fn handle(&self) -> SharedRateLimiter {
        self.limiter.clone()
    }
}

impl<S, Req> Layer<S> for RateLimiterLayer
where
    S: tower::Service<Req>,
{
    type Service = RateLimiter<S, Req>;

    fn layer(&self, service: S) -> Self::Service {
        RateLimiter::from_shared(service, self.limiter.clone())
    }
}
