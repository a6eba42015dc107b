use crate::config::{AdaptiveClientConfig, Strategy};
use crate::events::{AdaptiveClientEvent, WaitReason};
use crate::headers::{read_server_signal, ResponseHeaderView};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tower_resilience_core::clock::{Clock, TokioClock};
use tower_resilience_core::events::EventListeners;
use tower_resilience_core::registry::PolicyHandle;

/// Key used for calls that don't carry a per-client identity.
const GLOBAL_CLIENT: &str = "<global>";

struct ClientState {
    retry_after_until: Option<Instant>,
    backpressure: f64,
    attempt: u32,
    base_wait: Duration,
    last_wait: Duration,
    last_access: Instant,
}

impl ClientState {
    fn new(now: Instant) -> Self {
        Self {
            retry_after_until: None,
            backpressure: 0.0,
            attempt: 0,
            base_wait: Duration::ZERO,
            last_wait: Duration::ZERO,
            last_access: now,
        }
    }

    fn is_stale(&self, now: Instant, ttl: Duration) -> bool {
        now.duration_since(self.last_access) > ttl
    }
}

struct Inner {
    clients: HashMap<String, ClientState>,
    last_sweep: Instant,
}

/// What the caller should do before issuing a call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    /// Proceed immediately.
    Proceed,
    /// Sleep for this long, then proceed.
    Wait(Duration),
    /// Fail the call now instead of waiting (reject strategy only).
    Reject(Duration),
}

/// Outcome of reporting a response back to the client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackoffOutcome {
    /// The response wasn't a `429`; backoff state was reset.
    Ok,
    /// A `429` was observed; sleep this long before retrying.
    Wait(Duration),
    /// `max_retries` consecutive `429`s were observed; give up.
    Exhausted { attempts: u32 },
}

/// Dependency-light egress mirror of the server-side rate limiter and
/// backpressure calculator.
///
/// Tracks a `retry_after_timestamp` and a `backpressure` level per client id,
/// updated from response headers via [`AdaptiveClient::on_response`], and
/// consulted before each call via [`AdaptiveClient::before_call`]. Carries no
/// HTTP client of its own: callers drive their own request loop and hand this
/// type a [`ResponseHeaderView`] over whatever response they got back.
#[derive(Clone)]
pub struct AdaptiveClient {
    inner: Arc<Mutex<Inner>>,
    clock: Arc<dyn Clock>,
    backpressure_threshold: f64,
    max_wait: Duration,
    max_retries: u32,
    backoff_factor: f64,
    strategy: Strategy,
    stale_ttl: Duration,
    sweep_interval: Duration,
    max_clients: usize,
    event_listeners: EventListeners<AdaptiveClientEvent>,
    enabled: Arc<AtomicBool>,
    name: String,
}

impl AdaptiveClient {
    /// Builds a client from `config`.
    pub fn new(config: AdaptiveClientConfig) -> Self {
        Self::with_clock(config, Arc::new(TokioClock))
    }

    pub(crate) fn with_clock(config: AdaptiveClientConfig, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        Self {
            inner: Arc::new(Mutex::new(Inner {
                clients: HashMap::new(),
                last_sweep: now,
            })),
            clock,
            backpressure_threshold: config.backpressure_threshold,
            max_wait: config.max_wait,
            max_retries: config.max_retries,
            backoff_factor: config.backoff_factor,
            strategy: config.strategy,
            stale_ttl: config.stale_ttl,
            sweep_interval: config.sweep_interval,
            max_clients: config.max_clients,
            event_listeners: config.event_listeners,
            enabled: Arc::new(AtomicBool::new(true)),
            name: config.name,
        }
    }

    fn emit(&self, event: AdaptiveClientEvent) {
        self.event_listeners.emit(&event);
    }

    fn key(client_id: Option<&str>) -> &str {
        client_id.unwrap_or(GLOBAL_CLIENT)
    }

    /// Decides whether a call for `client_id` should proceed, wait, or be
    /// rejected, based on the last backpressure level and `Retry-After`
    /// deadline observed for that client.
    pub fn before_call(&self, client_id: Option<&str>) -> Decision {
        if !self.enabled.load(Ordering::Acquire) {
            return Decision::Proceed;
        }

        let now = self.clock.now();
        let mut inner = self.inner.lock().unwrap();
        self.sweep_stale_locked(&mut inner, now);

        let key = Self::key(client_id).to_string();
        let state = inner
            .clients
            .entry(key)
            .or_insert_with(|| ClientState::new(now));
        state.last_access = now;

        if state.backpressure >= self.backpressure_threshold {
            let wait = Duration::from_secs_f64(state.backpressure * 0.5).min(self.max_wait);
            self.emit(AdaptiveClientEvent::Waited {
                pattern_name: self.name.clone(),
                wait,
                reason: WaitReason::Backpressure,
                timestamp: now,
            });
            return Decision::Wait(wait);
        }

        if let Some(until) = state.retry_after_until {
            if until > now {
                let remaining = until - now;
                return match self.strategy {
                    Strategy::Queue => {
                        let wait = remaining.min(self.max_wait);
                        self.emit(AdaptiveClientEvent::Waited {
                            pattern_name: self.name.clone(),
                            wait,
                            reason: WaitReason::RetryAfter,
                            timestamp: now,
                        });
                        Decision::Wait(wait)
                    }
                    Strategy::Reject => {
                        self.emit(AdaptiveClientEvent::Rejected {
                            pattern_name: self.name.clone(),
                            retry_after: remaining,
                            timestamp: now,
                        });
                        Decision::Reject(remaining)
                    }
                };
            }
        }

        self.emit(AdaptiveClientEvent::Proceeded {
            pattern_name: self.name.clone(),
            timestamp: now,
        });
        Decision::Proceed
    }

    /// Updates per-client state from a response's headers and, on a `429`,
    /// advances the exponential backoff counter.
    ///
    /// Any status updates `backpressure`/`retry_after_until` when the
    /// corresponding header is present. Only `429` advances the backoff
    /// counter; any other status resets it.
    pub fn on_response(
        &self,
        client_id: Option<&str>,
        headers: &dyn ResponseHeaderView,
        status: u16,
    ) -> BackoffOutcome {
        let now = self.clock.now();
        let signal = read_server_signal(headers, status);

        let mut inner = self.inner.lock().unwrap();
        let key = Self::key(client_id).to_string();
        let state = inner
            .clients
            .entry(key)
            .or_insert_with(|| ClientState::new(now));
        state.last_access = now;

        if let Some(bp) = signal.backpressure {
            state.backpressure = bp;
        }
        if let Some(retry_after) = signal.retry_after {
            state.retry_after_until = Some(now + retry_after);
        }

        if status != 429 {
            state.attempt = 0;
            state.base_wait = Duration::ZERO;
            state.last_wait = Duration::ZERO;
            return BackoffOutcome::Ok;
        }

        if state.attempt == 0 {
            state.base_wait = signal.retry_after.unwrap_or(Duration::from_millis(100));
        }
        state.attempt += 1;

        if state.attempt > self.max_retries {
            let attempts = state.attempt;
            drop(inner);
            self.emit(AdaptiveClientEvent::RetriesExhausted {
                pattern_name: self.name.clone(),
                attempts,
                timestamp: now,
            });
            return BackoffOutcome::Exhausted { attempts };
        }

        let scale = self.backoff_factor.powi((state.attempt - 1) as i32);
        let wait = Duration::from_secs_f64(state.base_wait.as_secs_f64() * scale).min(self.max_wait);
        state.last_wait = wait;
        let attempt = state.attempt;
        drop(inner);

        self.emit(AdaptiveClientEvent::BackoffAdvanced {
            pattern_name: self.name.clone(),
            attempt,
            next_wait: wait,
            timestamp: now,
        });
        BackoffOutcome::Wait(wait)
    }

    fn sweep_stale_locked(&self, inner: &mut Inner, now: Instant) {
        if now.duration_since(inner.last_sweep) < self.sweep_interval {
            return;
        }
        let ttl = self.stale_ttl;
        inner.clients.retain(|_, c| !c.is_stale(now, ttl));
        inner.last_sweep = now;

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

    /// Clears all tracked per-client state, as if the client were freshly
    /// constructed.
    pub fn reset(&self) {
        let now = self.clock.now();
        let mut inner = self.inner.lock().unwrap();
        inner.clients.clear();
        inner.last_sweep = now;
    }
}

impl PolicyHandle for AdaptiveClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn pattern_type(&self) -> &'static str {
        "adaptive_client"
    }

    fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    fn update_config(&self, _update: &HashMap<String, String>) -> Result<(), String> {
        Err("tower-resilience-adaptive-client does not yet support live config updates".to_string())
    }

    fn current_config(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert(
            "backpressure_threshold".to_string(),
            self.backpressure_threshold.to_string(),
        );
        map.insert("max_wait_ms".to_string(), self.max_wait.as_millis().to_string());
        map.insert("max_retries".to_string(), self.max_retries.to_string());
        map.insert("backoff_factor".to_string(), self.backoff_factor.to_string());
        map
    }
}
