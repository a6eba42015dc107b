use std::time::Instant;
use tower_resilience_core::events::ResilienceEvent;

/// Events emitted by the feature-toggle middleware.
#[derive(Debug, Clone)]
pub enum FeatureToggleEvent {
    /// The call was permitted: the flag was on and the predicate, if any, allowed it.
    FeatureEnabled {
        pattern_name: String,
        timestamp: Instant,
    },
    /// The call was rejected: the flag was off, or the predicate rejected it.
    FeatureDisabled {
        pattern_name: String,
        timestamp: Instant,
    },
}

impl ResilienceEvent for FeatureToggleEvent {
    fn event_type(&self) -> &'static str {
        match self {
            FeatureToggleEvent::FeatureEnabled { .. } => "FeatureEnabled",
            FeatureToggleEvent::FeatureDisabled { .. } => "FeatureDisabled",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            FeatureToggleEvent::FeatureEnabled { timestamp, .. }
            | FeatureToggleEvent::FeatureDisabled { timestamp, .. } => *timestamp,
        }
    }

    fn pattern_name(&self) -> &str {
        match self {
            FeatureToggleEvent::FeatureEnabled { pattern_name, .. }
            | FeatureToggleEvent::FeatureDisabled { pattern_name, .. } => pattern_name,
        }
    }
}
