use crate::events::FeatureToggleEvent;
use crate::SharedPredicate;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tower_resilience_core::EventListeners;

/// Configuration for the feature-toggle pattern.
pub struct FeatureToggleConfig<Req> {
    pub(crate) enabled: Arc<AtomicBool>,
    pub(crate) predicate: Option<SharedPredicate<Req>>,
    pub(crate) event_listeners: EventListeners<FeatureToggleEvent>,
    pub(crate) name: String,
}

impl<Req> FeatureToggleConfig<Req> {
    /// Creates a new configuration builder.
    pub fn builder() -> FeatureToggleConfigBuilder<Req> {
        FeatureToggleConfigBuilder::new()
    }
}

/// Builder for configuring and constructing a feature toggle.
pub struct FeatureToggleConfigBuilder<Req> {
    enabled: bool,
    predicate: Option<SharedPredicate<Req>>,
    event_listeners: EventListeners<FeatureToggleEvent>,
    name: String,
}

impl<Req> FeatureToggleConfigBuilder<Req> {
    /// Creates a new builder with default values. The flag starts enabled.
    pub fn new() -> Self {
        Self {
            enabled: true,
            predicate: None,
            event_listeners: EventListeners::new(),
            name: String::from("<unnamed>"),
        }
    }

    /// Sets the initial state of the flag.
    ///
    /// Default: `true` (enabled)
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets a predicate evaluated against the request. When present, the
    /// call is only permitted if the flag is on AND the predicate returns
    /// `true`.
    pub fn predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Req) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Give this toggle a human-readable name for observability.
    ///
    /// Default: `<unnamed>`
    pub fn name<N: Into<String>>(mut self, n: N) -> Self {
        self.name = n.into();
        self
    }

    /// Register a callback for when a call is permitted.
    pub fn on_feature_enabled<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.event_listeners
            .add(tower_resilience_core::FnListener::new(
                move |event: &FeatureToggleEvent| {
                    if matches!(event, FeatureToggleEvent::FeatureEnabled { .. }) {
                        f();
                    }
                },
            ));
        self
    }

    /// Register a callback for when a call is rejected.
    pub fn on_feature_disabled<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.event_listeners
            .add(tower_resilience_core::FnListener::new(
                move |event: &FeatureToggleEvent| {
                    if matches!(event, FeatureToggleEvent::FeatureDisabled { .. }) {
                        f();
                    }
                },
            ));
        self
    }

    /// Builds the configuration and returns a `FeatureToggleLayer`.
    pub fn build(self) -> crate::layer::FeatureToggleLayer<Req> {
        let config = FeatureToggleConfig {
            enabled: Arc::new(AtomicBool::new(self.enabled)),
            predicate: self.predicate,
            event_listeners: self.event_listeners,
            name: self.name,
        };

        crate::layer::FeatureToggleLayer::new(config)
    }
}

impl<Req> Default for FeatureToggleConfigBuilder<Req> {
    fn default() -> Self {
        Self::new()
    }
}
