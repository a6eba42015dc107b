use std::time::Instant;
use tower_resilience_core::events::ResilienceEvent;

/// Events emitted by the fail-fast middleware.
#[derive(Debug, Clone)]
pub enum FailFastEvent {
    /// The gate opened, either because the failure threshold was reached or
    /// the predicate returned true. Once open, every call is rejected until
    /// `close()` is called explicitly.
    Opened {
        pattern_name: String,
        timestamp: Instant,
    },
    /// The gate was closed explicitly, clearing the failure count.
    Closed {
        pattern_name: String,
        timestamp: Instant,
    },
    /// A call was rejected because the gate is open.
    CallRejected {
        pattern_name: String,
        timestamp: Instant,
    },
    /// A call succeeded; the consecutive failure count was reset.
    SuccessRecorded {
        pattern_name: String,
        timestamp: Instant,
    },
    /// A watched failure was recorded.
    FailureRecorded {
        pattern_name: String,
        timestamp: Instant,
        consecutive_failure_count: usize,
    },
}

impl ResilienceEvent for FailFastEvent {
    fn event_type(&self) -> &'static str {
        match self {
            FailFastEvent::Opened { .. } => "Opened",
            FailFastEvent::Closed { .. } => "Closed",
            FailFastEvent::CallRejected { .. } => "CallRejected",
            FailFastEvent::SuccessRecorded { .. } => "SuccessRecorded",
            FailFastEvent::FailureRecorded { .. } => "FailureRecorded",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            FailFastEvent::Opened { timestamp, .. }
            | FailFastEvent::Closed { timestamp, .. }
            | FailFastEvent::CallRejected { timestamp, .. }
            | FailFastEvent::SuccessRecorded { timestamp, .. }
            | FailFastEvent::FailureRecorded { timestamp, .. } => *timestamp,
        }
    }

    fn pattern_name(&self) -> &str {
        match self {
            FailFastEvent::Opened { pattern_name, .. }
            | FailFastEvent::Closed { pattern_name, .. }
            | FailFastEvent::CallRejected { pattern_name, .. }
            | FailFastEvent::SuccessRecorded { pattern_name, .. }
            | FailFastEvent::FailureRecorded { pattern_name, .. } => pattern_name,
        }
    }
}
