//! Monotonic time source used for refill math and Retry-After calculations.
//!
//! Every timing decision in this workspace — token bucket refill, backoff
//! sleeps, staleness sweeps — goes through a `Clock` rather than calling
//! `Instant::now()` directly, so tests can advance time deterministically
//! instead of sleeping in real time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A monotonic time source.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// Production clock backed by `std::time::Instant`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A manually-advanced clock for deterministic tests.
///
/// Holds an offset from a fixed anchor instant; `advance` moves it forward.
#[derive(Clone)]
pub struct FakeClock {
    anchor: Instant,
    offset_nanos: Arc<AtomicU64>,
}

impl FakeClock {
    /// Creates a new fake clock anchored at the current instant.
    pub fn new() -> Self {
        Self {
            anchor: Instant::now(),
            offset_nanos: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Advances the clock by `duration`.
    pub fn advance(&self, duration: Duration) {
        self.offset_nanos
            .fetch_add(duration.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.anchor + Duration::from_nanos(self.offset_nanos.load(Ordering::SeqCst))
    }
}
