//! Event types for the cache pattern.

use std::time::Instant;
use tower_resilience_core::events::ResilienceEvent;

/// Events emitted by the cache pattern.
#[derive(Debug, Clone)]
pub enum CacheEvent {
    /// A requested key was found in the cache and was not expired.
    Hit {
        pattern_name: String,
        timestamp: Instant,
    },
    /// A requested key was not found in the cache, or had expired.
    Miss {
        pattern_name: String,
        timestamp: Instant,
    },
    /// A value was stored in the cache.
    Set {
        pattern_name: String,
        timestamp: Instant,
    },
    /// An entry was evicted to make room for a new one.
    Eviction {
        pattern_name: String,
        timestamp: Instant,
    },
}

impl ResilienceEvent for CacheEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CacheEvent::Hit { .. } => "cache_hit",
            CacheEvent::Miss { .. } => "cache_miss",
            CacheEvent::Set { .. } => "cache_set",
            CacheEvent::Eviction { .. } => "cache_eviction",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            CacheEvent::Hit { timestamp, .. } => *timestamp,
            CacheEvent::Miss { timestamp, .. } => *timestamp,
            CacheEvent::Set { timestamp, .. } => *timestamp,
            CacheEvent::Eviction { timestamp, .. } => *timestamp,
        }
    }

    fn pattern_name(&self) -> &str {
        match self {
            CacheEvent::Hit { pattern_name, .. } => pattern_name,
            CacheEvent::Miss { pattern_name, .. } => pattern_name,
            CacheEvent::Set { pattern_name, .. } => pattern_name,
            CacheEvent::Eviction { pattern_name, .. } => pattern_name,
        }
    }
}
