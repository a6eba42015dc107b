use rand::Rng;
use std::time::Duration;

/// Abstraction for computing retry intervals.
///
/// This trait allows for flexible backoff strategies including fixed delays,
/// exponential backoff, randomized backoff, and custom implementations.
pub trait IntervalFunction: Send + Sync {
    /// Computes the delay before the next retry attempt.
    ///
    /// # Arguments
    /// * `attempt` - The retry attempt number (0-indexed, so first retry is 0)
    fn next_interval(&self, attempt: usize) -> Duration;
}

/// Fixed interval backoff - returns the same duration for every retry.
#[derive(Debug, Clone)]
pub struct FixedInterval {
    duration: Duration,
}

impl FixedInterval {
    /// Creates a new fixed interval backoff.
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl IntervalFunction for FixedInterval {
    fn next_interval(&self, _attempt: usize) -> Duration {
        self.duration
    }
}

/// A finite ordered sequence of delays. Once exhausted, the last element is
/// returned for every subsequent attempt.
#[derive(Debug, Clone)]
pub struct SequenceBackoff {
    delays: Vec<Duration>,
}

impl SequenceBackoff {
    /// Creates a backoff from an explicit, non-empty sequence of delays.
    pub fn new(delays: Vec<Duration>) -> Self {
        assert!(!delays.is_empty(), "SequenceBackoff needs at least one delay");
        Self { delays }
    }
}

impl IntervalFunction for SequenceBackoff {
    fn next_interval(&self, attempt: usize) -> Duration {
        let idx = attempt.min(self.delays.len() - 1);
        self.delays[idx]
    }
}

/// Exponential backoff with configurable multiplier.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial_interval: Duration,
    multiplier: f64,
    max_interval: Option<Duration>,
}

impl ExponentialBackoff {
    /// Creates a new exponential backoff with default multiplier of 2.0.
    pub fn new(initial_interval: Duration) -> Self {
        Self {
            initial_interval,
            multiplier: 2.0,
            max_interval: None,
        }
    }

    /// Sets the multiplier for exponential growth.
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Sets the maximum interval to cap exponential growth.
    pub fn max_interval(mut self, max_interval: Duration) -> Self {
        self.max_interval = Some(max_interval);
        self
    }
}

impl IntervalFunction for ExponentialBackoff {
    fn next_interval(&self, attempt: usize) -> Duration {
        let multiplier = self.multiplier.powi(attempt as i32);
        let interval = self.initial_interval.mul_f64(multiplier);

        if let Some(max) = self.max_interval {
            interval.min(max)
        } else {
            interval
        }
    }
}

/// Exponential backoff with randomization to prevent thundering herd.
#[derive(Debug, Clone)]
pub struct ExponentialRandomBackoff {
    initial_interval: Duration,
    multiplier: f64,
    randomization_factor: f64,
    max_interval: Option<Duration>,
}

impl ExponentialRandomBackoff {
    /// Creates a new exponential random backoff.
    ///
    /// # Arguments
    /// * `initial_interval` - The base interval
    /// * `randomization_factor` - Factor for randomization (0.0 to 1.0)
    ///   A factor of 0.5 means the interval will be randomized between 50% and 150% of the calculated value.
    pub fn new(initial_interval: Duration, randomization_factor: f64) -> Self {
        Self {
            initial_interval,
            multiplier: 2.0,
            randomization_factor: randomization_factor.clamp(0.0, 1.0),
            max_interval: None,
        }
    }

    /// Sets the multiplier for exponential growth.
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Sets the maximum interval to cap exponential growth.
    pub fn max_interval(mut self, max_interval: Duration) -> Self {
        self.max_interval = Some(max_interval);
        self
    }

    fn randomize(&self, duration: Duration) -> Duration {
        let delta = duration.as_secs_f64() * self.randomization_factor;
        let min = duration.as_secs_f64() - delta;
        let max = duration.as_secs_f64() + delta;
        let randomized = rand::rng().random_range(min..=max);
        Duration::from_secs_f64(randomized.max(0.0))
    }
}

impl IntervalFunction for ExponentialRandomBackoff {
    fn next_interval(&self, attempt: usize) -> Duration {
        let multiplier = self.multiplier.powi(attempt as i32);
        let interval = self.initial_interval.mul_f64(multiplier);

        let capped = if let Some(max) = self.max_interval {
            interval.min(max)
        } else {
            interval
        };

        self.randomize(capped)
    }
}

/// Fibonacci-sequence backoff: delay grows as `min_delay * fib(attempt)`,
/// optionally capped.
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    min_delay: Duration,
    max_interval: Option<Duration>,
}

impl FibonacciBackoff {
    /// Creates a fibonacci backoff with the given base delay.
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            max_interval: None,
        }
    }

    /// Sets the maximum interval to cap growth.
    pub fn max_interval(mut self, max_interval: Duration) -> Self {
        self.max_interval = Some(max_interval);
        self
    }

    fn fib(n: usize) -> u64 {
        let (mut a, mut b) = (0u64, 1u64);
        for _ in 0..n {
            let next = a.saturating_add(b);
            a = b;
            b = next;
        }
        a.max(1)
    }
}

impl IntervalFunction for FibonacciBackoff {
    fn next_interval(&self, attempt: usize) -> Duration {
        let interval = self.min_delay.mul_f64(Self::fib(attempt + 1) as f64);
        match self.max_interval {
            Some(max) => interval.min(max),
            None => interval,
        }
    }
}

/// Function-based interval implementation.
pub struct FnInterval<F> {
    f: F,
}

impl<F> FnInterval<F>
where
    F: Fn(usize) -> Duration + Send + Sync,
{
    /// Creates a new function-based interval.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> IntervalFunction for FnInterval<F>
where
    F: Fn(usize) -> Duration + Send + Sync,
{
    fn next_interval(&self, attempt: usize) -> Duration {
        (self.f)(attempt)
    }
}
