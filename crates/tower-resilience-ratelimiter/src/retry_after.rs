//! Retry-After calculators: pure functions of bucket state plus their own
//! internal state, never blocking.

use rand::Rng;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Inputs available to every calculator variant.
#[derive(Debug, Clone, Copy)]
pub struct CalculatorInput<'a> {
    /// Tokens currently available.
    pub current_tokens: f64,
    /// Bucket capacity.
    pub bucket_capacity: f64,
    /// Refill rate in tokens/sec.
    pub token_rate: f64,
    /// Seconds until the next whole token.
    pub time_until_next: f64,
    /// Consecutive rejections for this client (0 if untracked).
    pub rejection_count: u64,
    /// Client identifier, if per-client tracking is active.
    pub client_id: Option<&'a str>,
}

/// Strategy selector for `create_calculator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAfterStrategy {
    /// Honor `time_until_next` literally.
    Fixed,
    /// Piecewise multiplier by utilization band.
    Utilization,
    /// Base delay plus uniform jitter.
    Jittered,
    /// Exponential in the per-client rejection count.
    Exponential,
    /// Inversely weighted by current utilization.
    Proportional,
    /// Hybrid P95/latency-gradient backpressure signal.
    Backpressure,
}

/// A pluggable strategy for computing how long a rejected caller should wait.
///
/// Implementations must be pure given `input` plus their own internal state,
/// and must never block.
pub trait RetryAfterCalculator: Send + Sync {
    /// Computes the wait time in milliseconds.
    fn calculate(&self, input: CalculatorInput<'_>) -> f64;
}

/// `time_until_next * 1000`, no smoothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedCalculator;

impl RetryAfterCalculator for FixedCalculator {
    fn calculate(&self, input: CalculatorInput<'_>) -> f64 {
        input.time_until_next * 1000.0
    }
}

/// Scales the raw wait by how far from saturated the bucket is: the emptier
/// the bucket (relative to capacity), the larger the penalty multiplier.
#[derive(Debug, Clone, Copy)]
pub struct ProportionalCalculator {
    /// Multiplier applied at zero utilization. Default 3.0.
    pub max_multiplier: f64,
}

impl Default for ProportionalCalculator {
    fn default() -> Self {
        Self { max_multiplier: 3.0 }
    }
}

impl RetryAfterCalculator for ProportionalCalculator {
    fn calculate(&self, input: CalculatorInput<'_>) -> f64 {
        let util = if input.bucket_capacity > 0.0 {
            input.current_tokens / input.bucket_capacity
        } else {
            0.0
        };
        (input.time_until_next * 1000.0) * (1.0 + (1.0 - util) * (self.max_multiplier - 1.0))
    }
}

/// Piecewise multiplier by utilization band: high utilization needs no
/// extra backoff, low utilization gets a harsher one.
#[derive(Debug, Clone, Copy)]
pub struct UtilizationCalculator {
    /// Utilization at/above which no penalty is applied. Default 0.8.
    pub aggressive_threshold: f64,
    /// Utilization at/above which a 1x multiplier applies. Default 0.5.
    pub warning_threshold: f64,
    /// Utilization at/above which a 2x multiplier applies. Default 0.2.
    pub normal_threshold: f64,
}

impl Default for UtilizationCalculator {
    fn default() -> Self {
        Self {
            aggressive_threshold: 0.8,
            warning_threshold: 0.5,
            normal_threshold: 0.2,
        }
    }
}

impl RetryAfterCalculator for UtilizationCalculator {
    fn calculate(&self, input: CalculatorInput<'_>) -> f64 {
        let util = if input.bucket_capacity > 0.0 {
            input.current_tokens / input.bucket_capacity
        } else {
            0.0
        };
        let multiplier = if util >= self.aggressive_threshold {
            0.0
        } else if util >= self.warning_threshold {
            1.0
        } else if util >= self.normal_threshold {
            2.0
        } else {
            4.0
        };
        (input.time_until_next * 1000.0) * multiplier
    }
}

/// Jitter mode for [`JitteredCalculator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JitterMode {
    /// `U(0, J)` — jitter can be anywhere in the full range.
    Full,
    /// `J/2 + U(0, J/2)` — yields `[J/2, J]`, read here as "around half":
    /// the midpoint of the jitter range is the expected value, not a floor
    /// guarantee. See SPEC_FULL.md §9 for the rationale.
    Equal,
}

/// Base delay plus uniform random jitter.
pub struct JitteredCalculator {
    /// Base delay in milliseconds, added before jitter.
    pub base_ms: f64,
    /// Jitter range in milliseconds.
    pub jitter_ms: f64,
    /// Jitter mode.
    pub mode: JitterMode,
}

impl Default for JitteredCalculator {
    fn default() -> Self {
        Self {
            base_ms: 0.0,
            jitter_ms: 1000.0,
            mode: JitterMode::Full,
        }
    }
}

impl RetryAfterCalculator for JitteredCalculator {
    fn calculate(&self, input: CalculatorInput<'_>) -> f64 {
        let base = self.base_ms + input.time_until_next * 1000.0;
        let jitter = match self.mode {
            JitterMode::Full => rand::rng().random_range(0.0..=self.jitter_ms),
            JitterMode::Equal => {
                self.jitter_ms / 2.0 + rand::rng().random_range(0.0..=self.jitter_ms / 2.0)
            }
        };
        base + jitter
    }
}

/// Exponential in the per-client (or global) consecutive rejection count,
/// clamped to `max_backoff_ms`.
pub struct ExponentialCalculator {
    /// Base delay in milliseconds for rejection_count == 0.
    pub base_ms: f64,
    /// Growth factor per rejection.
    pub factor: f64,
    /// Hard cap in milliseconds. Default 60,000.
    pub max_backoff_ms: f64,
}

impl Default for ExponentialCalculator {
    fn default() -> Self {
        Self {
            base_ms: 100.0,
            factor: 2.0,
            max_backoff_ms: 60_000.0,
        }
    }
}

impl RetryAfterCalculator for ExponentialCalculator {
    fn calculate(&self, input: CalculatorInput<'_>) -> f64 {
        let raw = self.base_ms * self.factor.powi(input.rejection_count as i32);
        raw.min(self.max_backoff_ms)
    }
}

/// Default calculator: `Utilization`, matching the upstream
/// `DEFAULT_CALCULATOR` before per-client backpressure tracking is
/// configured.
pub fn default_calculator() -> UtilizationCalculator {
    UtilizationCalculator::default()
}

/// Builds a calculator from a [`RetryAfterStrategy`] selector using default
/// parameters for the chosen variant. For `Backpressure`, use
/// [`crate::backpressure::BackpressureCalculator`] directly — it carries
/// materially more state than the other variants and does not fit this
/// default-parameter constructor.
pub fn create_calculator(strategy: RetryAfterStrategy) -> Box<dyn RetryAfterCalculator> {
    match strategy {
        RetryAfterStrategy::Fixed => Box::new(FixedCalculator),
        RetryAfterStrategy::Utilization => Box::new(UtilizationCalculator::default()),
        RetryAfterStrategy::Jittered => Box::new(JitteredCalculator::default()),
        RetryAfterStrategy::Exponential => Box::new(ExponentialCalculator::default()),
        RetryAfterStrategy::Proportional => Box::new(ProportionalCalculator::default()),
        RetryAfterStrategy::Backpressure => {
            panic!("Backpressure calculator must be constructed via BackpressureCalculator::new")
        }
    }
}

/// Like [`create_calculator`], but builds a default-configured
/// [`crate::backpressure::BackpressureCalculator`] for the `Backpressure`
/// variant instead of panicking. Used by [`crate::limiter::SharedRateLimiter`],
/// which has no reason to special-case the default strategy.
pub(crate) fn create_calculator_checked(strategy: RetryAfterStrategy) -> Box<dyn RetryAfterCalculator> {
    match strategy {
        RetryAfterStrategy::Backpressure => Box::new(crate::backpressure::BackpressureCalculator::new(
            crate::backpressure::BackpressureConfig::default(),
        )),
        other => create_calculator(other),
    }
}

/// Tracks per-client consecutive rejection counts with periodic reset, for
/// calculators (like `Exponential`) that need a rejection counter but are
/// used without the full `ClientRateLimitState` bookkeeping in `limiter.rs`.
#[derive(Default)]
pub struct PerClientRejectionCounter {
    counts: Mutex<HashMap<String, (u64, Instant)>>,
    reset_after: Duration,
}

impl PerClientRejectionCounter {
    /// Creates a counter that resets a client's count after `reset_after`
    /// has elapsed since its last increment.
    pub fn new(reset_after: Duration) -> Self {
        Self {
            counts: Mutex::new(HashMap::new()),
            reset_after,
        }
    }

    /// Increments and returns the client's rejection count.
    pub fn increment(&self, client_id: &str, now: Instant) -> u64 {
        let mut counts = self.counts.lock().unwrap();
        let entry = counts.entry(client_id.to_string()).or_insert((0, now));
        if now.duration_since(entry.1) > self.reset_after {
            entry.0 = 0;
        }
        entry.0 += 1;
        entry.1 = now;
        entry.0
    }
}
