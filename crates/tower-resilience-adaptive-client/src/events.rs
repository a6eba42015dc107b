//! Events emitted by [`crate::AdaptiveClient`] as it reacts to server signals.

use std::time::Instant;
use tower_resilience_core::events::ResilienceEvent;

/// Events raised while deciding whether a call should proceed, wait, or be
/// rejected.
#[derive(Debug, Clone)]
pub enum AdaptiveClientEvent {
    /// The call was admitted with no delay.
    Proceeded {
        pattern_name: String,
        timestamp: Instant,
    },
    /// The caller should sleep before issuing the call.
    Waited {
        pattern_name: String,
        wait: std::time::Duration,
        reason: WaitReason,
        timestamp: Instant,
    },
    /// The caller rejected the call outright (reject strategy, `Retry-After`
    /// still in the future).
    Rejected {
        pattern_name: String,
        retry_after: std::time::Duration,
        timestamp: Instant,
    },
    /// A `429` response was observed and the backoff counter advanced.
    BackoffAdvanced {
        pattern_name: String,
        attempt: u32,
        next_wait: std::time::Duration,
        timestamp: Instant,
    },
    /// The configured `max_retries` was exceeded after repeated `429`s.
    RetriesExhausted {
        pattern_name: String,
        attempts: u32,
        timestamp: Instant,
    },
}

/// Why [`AdaptiveClientEvent::Waited`] fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitReason {
    /// `backpressure >= threshold`.
    Backpressure,
    /// `retry_after_timestamp > now` under the queue strategy.
    RetryAfter,
    /// A `429` was seen and exponential backoff is in effect.
    TooManyRequests,
}

impl ResilienceEvent for AdaptiveClientEvent {
    fn event_type(&self) -> &'static str {
        match self {
            AdaptiveClientEvent::Proceeded { .. } => "adaptive_client_proceeded",
            AdaptiveClientEvent::Waited { .. } => "adaptive_client_waited",
            AdaptiveClientEvent::Rejected { .. } => "adaptive_client_rejected",
            AdaptiveClientEvent::BackoffAdvanced { .. } => "adaptive_client_backoff_advanced",
            AdaptiveClientEvent::RetriesExhausted { .. } => "adaptive_client_retries_exhausted",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            AdaptiveClientEvent::Proceeded { timestamp, .. }
            | AdaptiveClientEvent::Waited { timestamp, .. }
            | AdaptiveClientEvent::Rejected { timestamp, .. }
            | AdaptiveClientEvent::BackoffAdvanced { timestamp, .. }
            | AdaptiveClientEvent::RetriesExhausted { timestamp, .. } => *timestamp,
        }
    }

    fn pattern_name(&self) -> &str {
        match self {
            AdaptiveClientEvent::Proceeded { pattern_name, .. }
            | AdaptiveClientEvent::Waited { pattern_name, .. }
            | AdaptiveClientEvent::Rejected { pattern_name, .. }
            | AdaptiveClientEvent::BackoffAdvanced { pattern_name, .. }
            | AdaptiveClientEvent::RetriesExhausted { pattern_name, .. } => pattern_name,
        }
    }
}
