use crate::bucket::TokenBucket;
use crate::config::RateLimiterConfig;
use crate::error::RateLimiterError;
use crate::events::RateLimiterEvent;
use crate::retry_after::{CalculatorInput, RetryAfterCalculator};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};
use tower_resilience_core::clock::{Clock, TokioClock};
use tower_resilience_core::registry::PolicyHandle;

/// Per-client bookkeeping layered on top of the shared [`TokenBucket`].
struct ClientState {
    rejection_count: u64,
    last_rejection: Option<Instant>,
    last_success: Option<Instant>,
    last_access: Instant,
}

impl ClientState {
    fn new(now: Instant) -> Self {
        Self {
            rejection_count: 0,
            last_rejection: None,
            last_success: None,
            last_access: now,
        }
    }

    fn is_stale(&self, now: Instant, ttl: Duration) -> bool {
        let rejection_stale = match self.last_rejection {
            Some(t) => now.duration_since(t) > ttl,
            None => true,
        };
        let success_stale = match self.last_success {
            Some(t) => now.duration_since(t) > ttl,
            None => true,
        };
        rejection_stale && success_stale
    }
}

struct Inner {
    bucket: TokenBucket,
    calculator: Box<dyn RetryAfterCalculator>,
    clients: HashMap<String, ClientState>,
    last_sweep: Instant,
}

/// The bare rate limiter handle, usable outside of any tower stack (from
/// the control plane, or from the adaptive client's server-side twin).
///
/// Cloning shares the same underlying state.
#[derive(Clone)]
pub struct SharedRateLimiter {
    inner: Arc<Mutex<Inner>>,
    clock: Arc<dyn Clock>,
    max_executions: Arc<RwLock<f64>>,
    per_time_secs: Arc<RwLock<f64>>,
    bucket_size: Arc<RwLock<f64>>,
    stale_ttl: Duration,
    sweep_interval: Duration,
    max_clients: usize,
    enabled: Arc<AtomicBool>,
    name: String,
}

impl SharedRateLimiter {
    pub(crate) fn new(config: &RateLimiterConfig) -> Self {
        Self::with_clock(config, Arc::new(TokioClock))
    }

    pub(crate) fn with_clock(config: &RateLimiterConfig, clock: Arc<dyn Clock>) -> Self {
        let bucket = TokenBucket::new(
            config.max_executions,
            config.per_time_secs,
            config.bucket_size,
            clock.clone(),
        );
        let calculator = crate::retry_after::create_calculator_checked(config.strategy);
        Self {
            inner: Arc::new(Mutex::new(Inner {
                bucket,
                calculator,
                clients: HashMap::new(),
                last_sweep: clock.now(),
            })),
            clock,
            max_executions: Arc::new(RwLock::new(config.max_executions)),
            per_time_secs: Arc::new(RwLock::new(config.per_time_secs)),
            bucket_size: Arc::new(RwLock::new(config.bucket_size)),
            stale_ttl: config.stale_ttl,
            sweep_interval: config.sweep_interval,
            max_clients: config.max_clients,
            enabled: Arc::new(AtomicBool::new(true)),
            name: config.name.clone(),
        }
    }

    /// Attempts to acquire a permit for `client_id` (`None` routes to the
    /// global window). Returns the events to emit on the caller's behalf so
    /// that `tower::Service::call` can raise them alongside the pattern name.
    pub fn acquire(&self, client_id: Option<&str>) -> Result<RateLimiterEvent, RateLimiterEvent> {
        if !self.enabled.load(Ordering::Acquire) {
            return Ok(RateLimiterEvent::Acquired {
                pattern_name: self.name.clone(),
                client_id: client_id.map(str::to_string),
                tokens_remaining: f64::INFINITY,
            });
        }

        let now = self.clock.now();
        let mut inner = self.inner.lock().unwrap();
        self.sweep_stale_locked(&mut inner, now);

        let rejection_count = client_id
            .and_then(|id| inner.clients.get(id))
            .map(|c| c.rejection_count)
            .unwrap_or(0);

        match inner.bucket.take() {
            Ok(remaining) => {
                if let Some(id) = client_id {
                    let entry = inner
                        .clients
                        .entry(id.to_string())
                        .or_insert_with(|| ClientState::new(now));
                    entry.rejection_count = 0;
                    entry.last_success = Some(now);
                    entry.last_access = now;
                }
                Ok(RateLimiterEvent::Acquired {
                    pattern_name: self.name.clone(),
                    client_id: client_id.map(str::to_string),
                    tokens_remaining: remaining,
                })
            }
            Err(empty) => {
                let input = CalculatorInput {
                    current_tokens: inner.bucket.tokens(),
                    bucket_capacity: inner.bucket.capacity(),
                    token_rate: inner.bucket.refill_rate(),
                    time_until_next: empty.time_until_next,
                    rejection_count,
                    client_id,
                };
                let retry_after_ms = inner.calculator.calculate(input);

                let new_count = if let Some(id) = client_id {
                    let entry = inner
                        .clients
                        .entry(id.to_string())
                        .or_insert_with(|| ClientState::new(now));
                    entry.rejection_count += 1;
                    entry.last_rejection = Some(now);
                    entry.last_access = now;
                    entry.rejection_count
                } else {
                    rejection_count + 1
                };

                self.enforce_client_cap_locked(&mut inner);

                Err(RateLimiterEvent::Rejected {
                    pattern_name: self.name.clone(),
                    client_id: client_id.map(str::to_string),
                    retry_after_ms,
                    rejection_count: new_count,
                })
            }
        }
    }

    fn sweep_stale_locked(&self, inner: &mut Inner, now: Instant) {
        if now.duration_since(inner.last_sweep) < self.sweep_interval {
            return;
        }
        let ttl = self.stale_ttl;
        inner.clients.retain(|_, c| !c.is_stale(now, ttl));
        inner.last_sweep = now;
    }

    fn enforce_client_cap_locked(&self, inner: &mut Inner) {
        while inner.clients.len() > self.max_clients {
            if let Some(oldest) = inner
                .clients
                .iter()
                .min_by_key(|(_, c)| c.last_access)
                .map(|(id, _)| id.clone())
            {
                inner.clients.remove(&oldest);
            } else {
                break;
            }
        }
    }

    /// Current token count (advances refill first).
    pub fn tokens(&self) -> f64 {
        self.inner.lock().unwrap().bucket.tokens()
    }

    /// The bucket's current capacity.
    pub fn capacity(&self) -> f64 {
        self.inner.lock().unwrap().bucket.capacity()
    }

    /// The bucket's current refill rate, tokens/sec.
    pub fn refill_rate(&self) -> f64 {
        self.inner.lock().unwrap().bucket.refill_rate()
    }

    /// Whether the limiter currently admits calls.
    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Enables or disables the limiter.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// Applies new bucket parameters, invalidating the current bucket.
    /// Tokens are re-initialized to full capacity.
    pub fn reconfigure(&self, max_executions: f64, per_time_secs: f64, bucket_size: f64) {
        *self.max_executions.write().unwrap() = max_executions;
        *self.per_time_secs.write().unwrap() = per_time_secs;
        *self.bucket_size.write().unwrap() = bucket_size;

        let mut inner = self.inner.lock().unwrap();
        inner.bucket = TokenBucket::new(max_executions, per_time_secs, bucket_size, self.clock.clone());
    }
}

impl PolicyHandle for SharedRateLimiter {
    fn name(&self) -> &str {
        &self.name
    }

    fn pattern_type(&self) -> &'static str {
        "ratelimit"
    }

    fn enabled(&self) -> bool {
        SharedRateLimiter::enabled(self)
    }

    fn set_enabled(&self, enabled: bool) {
        SharedRateLimiter::set_enabled(self, enabled);
    }

    fn update_config(&self, update: &HashMap<String, String>) -> Result<(), String> {
        let mut max_executions = *self.max_executions.read().unwrap();
        let mut per_time_secs = *self.per_time_secs.read().unwrap();
        let mut bucket_size = *self.bucket_size.read().unwrap();

        if let Some(v) = update.get("max_executions") {
            max_executions = v.parse().map_err(|_| format!("invalid max_executions: {v}"))?;
        }
        if let Some(v) = update.get("per_time_secs") {
            per_time_secs = v.parse().map_err(|_| format!("invalid per_time_secs: {v}"))?;
        }
        if let Some(v) = update.get("bucket_size") {
            bucket_size = v.parse().map_err(|_| format!("invalid bucket_size: {v}"))?;
        }

        self.reconfigure(max_executions, per_time_secs, bucket_size);
        Ok(())
    }

    fn current_config(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("max_executions".to_string(), self.max_executions.read().unwrap().to_string());
        map.insert("per_time_secs".to_string(), self.per_time_secs.read().unwrap().to_string());
        map.insert("bucket_size".to_string(), self.bucket_size.read().unwrap().to_string());
        map
    }
}
