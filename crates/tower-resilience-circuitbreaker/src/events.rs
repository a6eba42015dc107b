use crate::circuit::CircuitState;
use std::time::Instant;
use tower_resilience_core::events::ResilienceEvent;

/// Events emitted by the circuit breaker middleware.
#[derive(Debug, Clone)]
pub enum CircuitBreakerEvent {
    /// The breaker transitioned from one state to another.
    StateTransition {
        pattern_name: String,
        timestamp: Instant,
        from_state: CircuitState,
        to_state: CircuitState,
    },
    /// A call was permitted through the breaker.
    CallPermitted {
        pattern_name: String,
        timestamp: Instant,
        state: CircuitState,
    },
    /// A call was rejected because the breaker is Failing.
    CallRejected {
        pattern_name: String,
        timestamp: Instant,
    },
    /// A call succeeded and was recorded by the breaker.
    SuccessRecorded {
        pattern_name: String,
        timestamp: Instant,
        state: CircuitState,
    },
    /// A watched failure was recorded by the breaker.
    FailureRecorded {
        pattern_name: String,
        timestamp: Instant,
        state: CircuitState,
    },
}

impl ResilienceEvent for CircuitBreakerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CircuitBreakerEvent::StateTransition { .. } => "StateTransition",
            CircuitBreakerEvent::CallPermitted { .. } => "CallPermitted",
            CircuitBreakerEvent::CallRejected { .. } => "CallRejected",
            CircuitBreakerEvent::SuccessRecorded { .. } => "SuccessRecorded",
            CircuitBreakerEvent::FailureRecorded { .. } => "FailureRecorded",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            CircuitBreakerEvent::StateTransition { timestamp, .. }
            | CircuitBreakerEvent::CallPermitted { timestamp, .. }
            | CircuitBreakerEvent::CallRejected { timestamp, .. }
            | CircuitBreakerEvent::SuccessRecorded { timestamp, .. }
            | CircuitBreakerEvent::FailureRecorded { timestamp, .. } => *timestamp,
        }
    }

    fn pattern_name(&self) -> &str {
        match self {
            CircuitBreakerEvent::StateTransition { pattern_name, .. }
            | CircuitBreakerEvent::CallPermitted { pattern_name, .. }
            | CircuitBreakerEvent::CallRejected { pattern_name, .. }
            | CircuitBreakerEvent::SuccessRecorded { pattern_name, .. }
            | CircuitBreakerEvent::FailureRecorded { pattern_name, .. } => pattern_name,
        }
    }
}
