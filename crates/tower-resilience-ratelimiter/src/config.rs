use crate::events::RateLimiterEvent;
use crate::retry_after::RetryAfterStrategy;
use std::time::Duration;
use tower_resilience_core::events::{EventListeners, FnListener};

/// Configuration for the rate limiter pattern.
pub struct RateLimiterConfig {
    pub(crate) max_executions: f64,
    pub(crate) per_time_secs: f64,
    pub(crate) bucket_size: f64,
    pub(crate) strategy: RetryAfterStrategy,
    pub(crate) stale_ttl: Duration,
    pub(crate) sweep_interval: Duration,
    pub(crate) max_clients: usize,
    pub(crate) event_listeners: EventListeners<RateLimiterEvent>,
    pub(crate) name: String,
}

impl RateLimiterConfig {
    /// Starts building a [`RateLimiterConfig`] with the default parameters.
    pub fn builder() -> RateLimiterConfigBuilder {
        RateLimiterConfigBuilder::new()
    }
}

/// Builder for [`RateLimiterConfig`].
pub struct RateLimiterConfigBuilder {
    max_executions: f64,
    per_time_secs: f64,
    bucket_size: f64,
    strategy: RetryAfterStrategy,
    stale_ttl: Duration,
    sweep_interval: Duration,
    max_clients: usize,
    event_listeners: EventListeners<RateLimiterEvent>,
    name: String,
}

impl Default for RateLimiterConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiterConfigBuilder {
    /// Creates a new builder with defaults.
    ///
    /// Defaults:
    /// - 50 executions per 1 second, bucket size 50 (starts full)
    /// - strategy: [`RetryAfterStrategy::Backpressure`]
    /// - per-client staleness TTL: 1 hour, swept every 5 minutes
    /// - max tracked clients: 100,000
    pub fn new() -> Self {
        Self {
            max_executions: 50.0,
            per_time_secs: 1.0,
            bucket_size: 50.0,
            strategy: RetryAfterStrategy::Backpressure,
            stale_ttl: Duration::from_secs(3600),
            sweep_interval: Duration::from_secs(300),
            max_clients: 100_000,
            event_listeners: EventListeners::new(),
            name: "<unnamed>".to_string(),
        }
    }

    /// Sets the number of executions admitted per `per_time_secs`.
    pub fn limit_for_period(mut self, limit: usize) -> Self {
        self.max_executions = limit as f64;
        self
    }

    /// Sets the refill period, in seconds, over which `limit_for_period`
    /// executions are admitted.
    pub fn refresh_period(mut self, duration: Duration) -> Self {
        self.per_time_secs = duration.as_secs_f64();
        self
    }

    /// Sets the bucket's burst capacity. Defaults to `limit_for_period`.
    pub fn bucket_size(mut self, size: f64) -> Self {
        self.bucket_size = size;
        self
    }

    /// Selects the Retry-After calculation strategy.
    pub fn retry_after_strategy(mut self, strategy: RetryAfterStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets how long a per-client entry may go without activity before it
    /// is eligible for eviction during a sweep.
    pub fn stale_ttl(mut self, ttl: Duration) -> Self {
        self.stale_ttl = ttl;
        self
    }

    /// Sets how often stale-client sweeps run.
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Caps the per-client map size; oldest-by-last-access entries are
    /// evicted first once the cap is reached.
    pub fn max_clients(mut self, max_clients: usize) -> Self {
        self.max_clients = max_clients;
        self
    }

    /// Sets the name for this rate limiter instance (used in events and
    /// control-plane registration).
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback invoked when a permit is acquired.
    pub fn on_acquired<F>(mut self, f: F) -> Self
    where
        F: Fn(Option<&str>, f64) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RateLimiterEvent::Acquired {
                client_id,
                tokens_remaining,
                ..
            } = event
            {
                f(client_id.as_deref(), *tokens_remaining);
            }
        }));
        self
    }

    /// Registers a callback invoked when a permit request is rejected.
    pub fn on_rejected<F>(mut self, f: F) -> Self
    where
        F: Fn(Option<&str>, f64) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RateLimiterEvent::Rejected {
                client_id,
                retry_after_ms,
                ..
            } = event
            {
                f(client_id.as_deref(), *retry_after_ms);
            }
        }));
        self
    }

    /// Finishes building a plain [`RateLimiterConfig`], without wrapping it
    /// in a tower layer. Useful for constructing a bare [`crate::limiter::SharedRateLimiter`]
    /// directly.
    pub fn into_config(self) -> RateLimiterConfig {
        RateLimiterConfig {
            max_executions: self.max_executions,
            per_time_secs: self.per_time_secs,
            bucket_size: self.bucket_size,
            strategy: self.strategy,
            stale_ttl: self.stale_ttl,
            sweep_interval: self.sweep_interval,
            max_clients: self.max_clients,
            event_listeners: self.event_listeners,
            name: self.name,
        }
    }

    /// Builds the rate limiter layer.
    pub fn build(self) -> crate::RateLimiterLayer {
        crate::RateLimiterLayer::new(self.into_config())
    }
}
