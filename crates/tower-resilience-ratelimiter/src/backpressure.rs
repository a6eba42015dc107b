//! Hybrid P95/latency-gradient backpressure calculator.
//!
//! The default Retry-After strategy. Two independent stress signals are
//! computed from recent latency samples — a service-quality component
//! (`BP_P95`, outlier count against a slowly-adapting SLO baseline) and a
//! queue-congestion component (`BP_Gradient`, current average latency
//! against a hard floor) — and the worse of the two drives the wait time.

use crate::retry_after::{CalculatorInput, RetryAfterCalculator};
use rand::Rng;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

const RECENT_WINDOW: usize = 100;
const HISTORICAL_WINDOW: usize = 5_000;
const BASELINE_UPDATE_PROBABILITY: f64 = 0.1;
const MIN_HISTORICAL_SAMPLES: usize = 50;
const BASELINE_EMA_ALPHA: f64 = 0.05;
const STALE_SWEEP_INTERVAL: Duration = Duration::from_secs(300);
const STALE_TTL: Duration = Duration::from_secs(3600);

/// A bounded ring buffer of `f64` samples.
struct Ring {
    buf: VecDeque<f64>,
    capacity: usize,
}

impl Ring {
    fn new(capacity: usize) -> Self {
        Self {
            buf: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, value: f64) {
        if self.buf.len() == self.capacity {
            self.buf.pop_front();
        }
        self.buf.push_back(value);
    }

    fn len(&self) -> usize {
        self.buf.len()
    }

    fn mean(&self) -> f64 {
        if self.buf.is_empty() {
            0.0
        } else {
            self.buf.iter().sum::<f64>() / self.buf.len() as f64
        }
    }

    fn outlier_count(&self, threshold: f64) -> usize {
        self.buf.iter().filter(|&&x| x > threshold).count()
    }

    /// Nearest-rank p95 over the current contents.
    fn p95(&self) -> f64 {
        if self.buf.is_empty() {
            return 0.0;
        }
        let mut sorted: Vec<f64> = self.buf.iter().copied().collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let idx = ((sorted.len() as f64) * 0.95).ceil() as usize;
        let idx = idx.saturating_sub(1).min(sorted.len() - 1);
        sorted[idx]
    }
}

/// Per-client latency tracking, mirroring the global rings at smaller scale.
struct ClientState {
    recent: Ring,
    last_access: Instant,
}

struct Inner {
    recent_latencies: Ring,
    historical_latencies: Ring,
    p95_baseline: f64,
    clients: HashMap<String, ClientState>,
    last_sweep: Instant,
    /// Precomputed cubic curve L[i] = (i/W)^3 for i in [0..=W].
    curve: Vec<f64>,
}

/// Tunable parameters for [`BackpressureCalculator`].
#[derive(Debug, Clone, Copy)]
pub struct BackpressureConfig {
    /// Target SLO latency, seconds. Default 0.2.
    pub p95_baseline_initial: f64,
    /// Floor latency below which there is no congestion signal. Default 0.05.
    pub min_latency: f64,
    /// Divides the above-floor excess to produce the gradient score. Default 1.0.
    pub gradient_sensitivity: f64,
    /// Base retry delay added before the penalty term, seconds. Default 0.1.
    pub min_retry_delay: f64,
    /// Maximum additional penalty at bp == 1.0, seconds. Default 2.0.
    pub max_retry_penalty: f64,
    /// Whether per-client ring tracking is enabled.
    pub enable_per_client_tracking: bool,
}

impl Default for BackpressureConfig {
    fn default() -> Self {
        Self {
            p95_baseline_initial: 0.2,
            min_latency: 0.05,
            gradient_sensitivity: 1.0,
            min_retry_delay: 0.1,
            max_retry_penalty: 2.0,
            enable_per_client_tracking: false,
        }
    }
}

/// Hybrid P95/gradient backpressure calculator with per-client state.
pub struct BackpressureCalculator {
    config: BackpressureConfig,
    inner: Mutex<Inner>,
}

impl BackpressureCalculator {
    /// Creates a calculator with the given configuration.
    pub fn new(config: BackpressureConfig) -> Self {
        let curve = (0..=RECENT_WINDOW)
            .map(|i| (i as f64 / RECENT_WINDOW as f64).powi(3))
            .collect();
        Self {
            inner: Mutex::new(Inner {
                recent_latencies: Ring::new(RECENT_WINDOW),
                historical_latencies: Ring::new(HISTORICAL_WINDOW),
                p95_baseline: config.p95_baseline_initial,
                clients: HashMap::new(),
                last_sweep: Instant::now(),
                curve,
            }),
            config,
        }
    }

    /// Records a latency sample (seconds), optionally attributed to a
    /// client. Updates the global rings, probabilistically adapts the
    /// baseline, updates the per-client ring if tracking is enabled, and
    /// opportunistically sweeps stale client state.
    pub fn record_latency(&self, latency_secs: f64, client_id: Option<&str>) {
        let mut inner = self.inner.lock().unwrap();
        inner.recent_latencies.push(latency_secs);
        inner.historical_latencies.push(latency_secs);

        if inner.historical_latencies.len() >= MIN_HISTORICAL_SAMPLES
            && rand::rng().random_bool(BASELINE_UPDATE_PROBABILITY)
        {
            let p95 = inner.historical_latencies.p95();
            inner.p95_baseline = (1.0 - BASELINE_EMA_ALPHA) * inner.p95_baseline + BASELINE_EMA_ALPHA * p95;
        }

        if self.config.enable_per_client_tracking {
            if let Some(id) = client_id {
                let now = Instant::now();
                let entry = inner.clients.entry(id.to_string()).or_insert_with(|| ClientState {
                    recent: Ring::new(RECENT_WINDOW),
                    last_access: now,
                });
                entry.recent.push(latency_secs);
                entry.last_access = now;
            }
        }

        self.sweep_stale_clients(&mut inner);
    }

    fn sweep_stale_clients(&self, inner: &mut Inner) {
        let now = Instant::now();
        if now.duration_since(inner.last_sweep) < STALE_SWEEP_INTERVAL {
            return;
        }
        inner.clients.retain(|_, c| now.duration_since(c.last_access) <= STALE_TTL);
        inner.last_sweep = now;
    }

    fn bp_components(&self, inner: &Inner, client_id: Option<&str>) -> (f64, f64) {
        let window: &Ring = match client_id.and_then(|id| inner.clients.get(id)) {
            Some(c) => &c.recent,
            None => &inner.recent_latencies,
        };

        let outlier_count = window.outlier_count(inner.p95_baseline).min(RECENT_WINDOW);
        let bp_p95 = inner.curve[outlier_count];

        let bp_gradient = if window.len() < 5 {
            0.0
        } else {
            let avg = window.mean();
            if avg <= self.config.min_latency {
                0.0
            } else {
                ((avg - self.config.min_latency)
                    / (self.config.min_latency * self.config.gradient_sensitivity))
                    .min(1.0)
            }
        };

        (bp_p95, bp_gradient)
    }

    /// Returns the current backpressure scalar in [0, 1] for the given
    /// client (or the global window if `None`), suitable for surfacing as
    /// an `X-Backpressure` header.
    pub fn get_backpressure(&self, client_id: Option<&str>) -> f64 {
        let inner = self.inner.lock().unwrap();
        let (bp_p95, bp_gradient) = self.bp_components(&inner, client_id);
        bp_p95.max(bp_gradient)
    }

    /// The current SLO baseline (seconds).
    pub fn p95_baseline(&self) -> f64 {
        self.inner.lock().unwrap().p95_baseline
    }
}

impl RetryAfterCalculator for BackpressureCalculator {
    fn calculate(&self, input: CalculatorInput<'_>) -> f64 {
        let inner = self.inner.lock().unwrap();
        let (bp_p95, bp_gradient) = self.bp_components(&inner, input.client_id);
        let bp = bp_p95.max(bp_gradient);

        if bp < 0.01 {
            return (input.time_until_next * 1000.0).max(10.0);
        }

        let jitter = rand::rng().random_range(0.8..=1.2);
        let retry_seconds =
            (self.config.min_retry_delay + self.config.max_retry_penalty * bp) * jitter;
        retry_seconds * 1000.0
    }
}
