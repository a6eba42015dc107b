use crate::events::FailFastEvent;
use crate::{SharedFailureClassifier, SharedPredicate};
use std::sync::Arc;
use tower_resilience_core::EventListeners;

/// Configuration for the fail-fast pattern.
pub struct FailFastConfig<Req, Res, Err> {
    pub(crate) failure_threshold: Option<usize>,
    pub(crate) predicate: Option<SharedPredicate<Req>>,
    pub(crate) failure_classifier: SharedFailureClassifier<Res, Err>,
    pub(crate) event_listeners: EventListeners<FailFastEvent>,
    pub(crate) name: String,
}

impl<Req, Res, Err> FailFastConfig<Req, Res, Err> {
    /// Creates a new configuration builder.
    pub fn builder() -> FailFastConfigBuilder<Req, Res, Err> {
        FailFastConfigBuilder::new()
    }
}

/// Builder for configuring and constructing a fail-fast gate.
pub struct FailFastConfigBuilder<Req, Res, Err> {
    failure_threshold: Option<usize>,
    predicate: Option<SharedPredicate<Req>>,
    failure_classifier: SharedFailureClassifier<Res, Err>,
    event_listeners: EventListeners<FailFastEvent>,
    name: String,
}

impl<Req, Res, Err> FailFastConfigBuilder<Req, Res, Err> {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            failure_threshold: None,
            predicate: None,
            failure_classifier: Arc::new(|res| res.is_err()),
            event_listeners: EventListeners::new(),
            name: String::from("<unnamed>"),
        }
    }

    /// Sets the number of consecutive watched failures that open the gate.
    ///
    /// `None` (the default) disables count-based opening entirely; the gate
    /// then only opens via the predicate or an explicit `open()` call.
    pub fn failure_threshold(mut self, count: usize) -> Self {
        self.failure_threshold = Some(count);
        self
    }

    /// Sets a predicate evaluated against the request before the inner
    /// service is called. A `true` return opens the gate immediately and
    /// rejects the call, without ever reaching the inner service.
    pub fn predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Req) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Sets a custom failure classifier function, i.e. the watched exception set.
    ///
    /// Default: classifies errors as failures.
    pub fn failure_classifier<F>(mut self, classifier: F) -> Self
    where
        F: Fn(&Result<Res, Err>) -> bool + Send + Sync + 'static,
    {
        self.failure_classifier = Arc::new(classifier);
        self
    }

    /// Give this gate a human-readable name for observability.
    ///
    /// Default: `<unnamed>`
    pub fn name<N: Into<String>>(mut self, n: N) -> Self {
        self.name = n.into();
        self
    }

    /// Register a callback for when the gate opens.
    pub fn on_open<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.event_listeners
            .add(tower_resilience_core::FnListener::new(
                move |event: &FailFastEvent| {
                    if matches!(event, FailFastEvent::Opened { .. }) {
                        f();
                    }
                },
            ));
        self
    }

    /// Register a callback for when the gate closes.
    pub fn on_close<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.event_listeners
            .add(tower_resilience_core::FnListener::new(
                move |event: &FailFastEvent| {
                    if matches!(event, FailFastEvent::Closed { .. }) {
                        f();
                    }
                },
            ));
        self
    }

    /// Register a callback for rejected calls.
    pub fn on_call_rejected<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.event_listeners
            .add(tower_resilience_core::FnListener::new(
                move |event: &FailFastEvent| {
                    if matches!(event, FailFastEvent::CallRejected { .. }) {
                        f();
                    }
                },
            ));
        self
    }

    /// Builds the configuration and returns a `FailFastLayer`.
    pub fn build(self) -> crate::layer::FailFastLayer<Req, Res, Err> {
        let config = FailFastConfig {
            failure_threshold: self.failure_threshold,
            predicate: self.predicate,
            failure_classifier: self.failure_classifier,
            event_listeners: self.event_listeners,
            name: self.name,
        };

        crate::layer::FailFastLayer::new(config)
    }
}

impl<Req, Res, Err> Default for FailFastConfigBuilder<Req, Res, Err> {
    fn default() -> Self {
        Self::new()
    }
}
