use crate::events::AdaptiveClientEvent;
use std::time::Duration;
use tower_resilience_core::events::{EventListeners, FnListener};

/// What to do when a `Retry-After` deadline from a prior response is still
/// in the future at the time of the next call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Sleep until the deadline, bounded by `max_wait`.
    Queue,
    /// Fail the call immediately instead of sleeping.
    Reject,
}

/// Configuration for [`crate::AdaptiveClient`].
pub struct AdaptiveClientConfig {
    pub(crate) backpressure_threshold: f64,
    pub(crate) max_wait: Duration,
    pub(crate) max_retries: u32,
    pub(crate) backoff_factor: f64,
    pub(crate) strategy: Strategy,
    pub(crate) stale_ttl: Duration,
    pub(crate) sweep_interval: Duration,
    pub(crate) max_clients: usize,
    pub(crate) event_listeners: EventListeners<AdaptiveClientEvent>,
    pub(crate) name: String,
}

impl AdaptiveClientConfig {
    /// Starts building an [`AdaptiveClientConfig`] with the default
    /// parameters.
    pub fn builder() -> AdaptiveClientConfigBuilder {
        AdaptiveClientConfigBuilder::new()
    }
}

/// Builder for [`AdaptiveClientConfig`].
pub struct AdaptiveClientConfigBuilder {
    backpressure_threshold: f64,
    max_wait: Duration,
    max_retries: u32,
    backoff_factor: f64,
    strategy: Strategy,
    stale_ttl: Duration,
    sweep_interval: Duration,
    max_clients: usize,
    event_listeners: EventListeners<AdaptiveClientEvent>,
    name: String,
}

impl Default for AdaptiveClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AdaptiveClientConfigBuilder {
    /// Creates a new builder with defaults.
    ///
    /// Defaults:
    /// - backpressure threshold: 0.8 (sleep `backpressure * 0.5` seconds at
    ///   or above this)
    /// - max wait: 30 seconds
    /// - max retries on repeated 429s: 5
    /// - backoff factor: 2.0 (`last_wait * factor^(attempt-1)`, capped by
    ///   `max_wait`)
    /// - strategy: [`Strategy::Queue`]
    /// - per-client staleness TTL: 1 hour, swept every 5 minutes
    /// - max tracked clients: 100,000
    pub fn new() -> Self {
        Self {
            backpressure_threshold: 0.8,
            max_wait: Duration::from_secs(30),
            max_retries: 5,
            backoff_factor: 2.0,
            strategy: Strategy::Queue,
            stale_ttl: Duration::from_secs(3600),
            sweep_interval: Duration::from_secs(300),
            max_clients: 100_000,
            event_listeners: EventListeners::new(),
            name: "<unnamed>".to_string(),
        }
    }

    /// Sets the backpressure level at or above which a call is delayed.
    pub fn backpressure_threshold(mut self, threshold: f64) -> Self {
        self.backpressure_threshold = threshold;
        self
    }

    /// Caps how long any single wait (backpressure, `Retry-After` queueing,
    /// or 429 backoff) may sleep for.
    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// Sets how many consecutive `429`s are tolerated before
    /// [`crate::AdaptiveClient::on_response`] reports the retry budget
    /// exhausted.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the exponential backoff multiplier applied per consecutive 429.
    pub fn backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = factor;
        self
    }

    /// Sets what happens when a `Retry-After` deadline is still pending.
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets how long a client's state may go unused before it's swept.
    pub fn stale_ttl(mut self, ttl: Duration) -> Self {
        self.stale_ttl = ttl;
        self
    }

    /// Sets how often the stale-client sweep runs, opportunistically, on
    /// mutating calls.
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Caps the number of distinct client ids tracked at once; the
    /// least-recently-active is evicted past this bound.
    pub fn max_clients(mut self, max_clients: usize) -> Self {
        self.max_clients = max_clients;
        self
    }

    /// Sets the instance name reported in emitted events.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a listener invoked on every [`AdaptiveClientEvent`].
    pub fn on_event<F>(mut self, f: F) -> Self
    where
        F: Fn(&AdaptiveClientEvent) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(f));
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> AdaptiveClientConfig {
        assert!(
            (0.0..=1.0).contains(&self.backpressure_threshold),
            "backpressure_threshold must be within [0, 1]"
        );
        assert!(self.backoff_factor > 1.0, "backoff_factor must be > 1.0");
        assert!(self.max_retries >= 1, "max_retries must be at least 1");

        AdaptiveClientConfig {
            backpressure_threshold: self.backpressure_threshold,
            max_wait: self.max_wait,
            max_retries: self.max_retries,
            backoff_factor: self.backoff_factor,
            strategy: self.strategy,
            stale_ttl: self.stale_ttl,
            sweep_interval: self.sweep_interval,
            max_clients: self.max_clients,
            event_listeners: self.event_listeners,
            name: self.name,
        }
    }
}
