//! Continuous-refill token bucket.
//!
//! Unlike the fixed/sliding-window limiters elsewhere in this workspace,
//! this bucket never resets to a window boundary: tokens trickle back in
//! continuously at `refill_rate` tokens/sec, computed lazily from elapsed
//! time on every access.

use std::sync::{Arc, Mutex};
use tower_resilience_core::clock::Clock;

/// Signal that the bucket had no tokens available. Never surfaced to
/// callers directly — the rate limiter converts it into `RateLimitExceeded`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmptyBucket {
    /// Seconds until a whole token becomes available.
    pub time_until_next: f64,
}

struct State {
    tokens: f64,
    last_refill_at: std::time::Instant,
}

/// A continuous leaky-refill token bucket.
///
/// `take()` first advances `tokens` by `refill_rate * elapsed`, clamped to
/// `capacity`, then either decrements by one (admit) or reports
/// [`EmptyBucket`] with the wait time until the next token. Holding time of
/// the internal mutex is O(1) — no awaiting is ever done under the lock.
pub struct TokenBucket {
    capacity: f64,
    refill_rate: f64,
    state: Mutex<State>,
    clock: Arc<dyn Clock>,
}

impl TokenBucket {
    /// Creates a bucket with `capacity` tokens, refilling at
    /// `max_executions / per_time_secs` tokens/sec, starting full.
    pub fn new(max_executions: f64, per_time_secs: f64, bucket_size: f64, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        Self {
            capacity: bucket_size,
            refill_rate: max_executions / per_time_secs,
            state: Mutex::new(State {
                tokens: bucket_size,
                last_refill_at: now,
            }),
            clock,
        }
    }

    fn refill_locked(&self, state: &mut State) {
        let now = self.clock.now();
        let elapsed = now.saturating_duration_since(state.last_refill_at).as_secs_f64();
        if elapsed > 0.0 {
            state.tokens = (state.tokens + self.refill_rate * elapsed).min(self.capacity);
            state.last_refill_at = now;
        }
    }

    /// Attempts to take one token. On success, returns the tokens remaining.
    /// On failure, returns [`EmptyBucket`] with the wait time until the next
    /// whole token.
    pub fn take(&self) -> Result<f64, EmptyBucket> {
        let mut state = self.state.lock().unwrap();
        self.refill_locked(&mut state);
        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            Ok(state.tokens)
        } else {
            let time_until_next = if self.refill_rate > 0.0 {
                (1.0 - state.tokens) / self.refill_rate
            } else {
                f64::INFINITY
            };
            Err(EmptyBucket { time_until_next })
        }
    }

    /// Reads the current token count, advancing refill first.
    pub fn tokens(&self) -> f64 {
        let mut state = self.state.lock().unwrap();
        self.refill_locked(&mut state);
        state.tokens
    }

    /// The bucket's capacity.
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// The bucket's refill rate in tokens/sec.
    pub fn refill_rate(&self) -> f64 {
        self.refill_rate
    }
}
