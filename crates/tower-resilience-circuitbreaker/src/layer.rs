use crate::config::{CircuitBreakerConfig, CircuitBreakerConfigBuilder};
use crate::CircuitBreaker;
use std::sync::Arc;
use std::time::Duration;
use tower::Layer;

/// A Tower [`Layer`] that applies circuit breaker behavior to an inner service.
///
/// # Examples
///
/// ```
/// use tower::{ServiceBuilder, service_fn};
/// use tower_resilience_circuitbreaker::CircuitBreakerLayer;
///
/// let layer = CircuitBreakerLayer::builder()
///     .failure_threshold(5)
///     .build();
///
/// let service = ServiceBuilder::new()
///     .layer(layer)
///     .service(service_fn(|req: String| async move { Ok::<_, std::io::Error>(req) }));
/// ```
#[derive(Clone)]
pub struct CircuitBreakerLayer<Res, Err> {
    config: Arc<CircuitBreakerConfig<Res, Err>>,
}

impl<Res, Err> CircuitBreakerLayer<Res, Err> {
    pub(crate) fn new(config: impl Into<Arc<CircuitBreakerConfig<Res, Err>>>) -> Self {
        Self {
            config: config.into(),
        }
    }

    /// Creates a new builder for configuring a circuit breaker layer.
    pub fn builder() -> CircuitBreakerConfigBuilder<Res, Err> {
        CircuitBreakerConfigBuilder::new()
    }

    // =========================================================================
    // Presets
    // =========================================================================

    /// Preset: standard balanced circuit breaker configuration.
    ///
    /// - 5 consecutive failures trip the breaker
    /// - 30 second recovery time before probing
    /// - 1 consecutive success to close
    pub fn standard() -> CircuitBreakerConfigBuilder<Res, Err> {
        Self::builder()
            .failure_threshold(5)
            .recovery_time(Duration::from_secs(30))
            .recovery_threshold(1)
    }

    /// Preset: fast-fail circuit breaker for latency-sensitive scenarios.
    ///
    /// - 2 consecutive failures trip the breaker
    /// - 10 second recovery time
    /// - 1 consecutive success to close
    pub fn fast_fail() -> CircuitBreakerConfigBuilder<Res, Err> {
        Self::builder()
            .failure_threshold(2)
            .recovery_time(Duration::from_secs(10))
            .recovery_threshold(1)
    }

    /// Preset: tolerant circuit breaker for resilient scenarios.
    ///
    /// - 10 consecutive failures trip the breaker
    /// - 60 second recovery time
    /// - 3 consecutive successes to close
    pub fn tolerant() -> CircuitBreakerConfigBuilder<Res, Err> {
        Self::builder()
            .failure_threshold(10)
            .recovery_time(Duration::from_secs(60))
            .recovery_threshold(3)
    }
}

impl<S, Req, Res, Err> Layer<S> for CircuitBreakerLayer<Res, Err>
where
    S: tower::Service<Req, Response = Res, Error = Err>,
{
    type Service = CircuitBreaker<S, Req, Res, Err>;

    fn layer(&self, service: S) -> Self::Service {
        CircuitBreaker::new(service, Arc::clone(&self.config))
    }
}
