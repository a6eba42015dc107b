use crate::config::CircuitBreakerConfig;
use crate::events::CircuitBreakerEvent;
#[cfg(feature = "metrics")]
use metrics::{counter, gauge};
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Instant;

/// Represents the state of the circuit breaker.
///
/// Maps onto the three-state model: `Closed` is Working, `Open` is Failing,
/// `HalfOpen` is Recovering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CircuitState {
    /// Working: normal operation, calls pass through.
    Closed = 0,
    /// Failing: calls are rejected immediately.
    Open = 1,
    /// Recovering: a limited number of calls are allowed through to probe recovery.
    HalfOpen = 2,
}

impl CircuitState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => CircuitState::Closed,
            1 => CircuitState::Open,
            2 => CircuitState::HalfOpen,
            _ => CircuitState::Closed, // Default to Closed for safety
        }
    }
}

/// Snapshot of circuit breaker counters for observability.
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitMetrics {
    /// Current state of the circuit breaker.
    pub state: CircuitState,
    /// Consecutive watched failures recorded in the current state.
    pub consecutive_failure_count: usize,
    /// Consecutive successes recorded in the current state (relevant in Recovering).
    pub consecutive_success_count: usize,
    /// Time since the last state transition.
    pub time_since_state_change: std::time::Duration,
}

pub(crate) struct Circuit {
    state: CircuitState,
    state_atomic: std::sync::Arc<AtomicU8>,
    last_state_change: Instant,
    consecutive_failure_count: usize,
    consecutive_success_count: usize,
    opened_at: Option<Instant>,
}

impl Default for Circuit {
    fn default() -> Self {
        Self::new_with_atomic(std::sync::Arc::new(AtomicU8::new(
            CircuitState::Closed as u8,
        )))
    }
}

impl Circuit {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn new_with_atomic(state_atomic: std::sync::Arc<AtomicU8>) -> Self {
        Self {
            state: CircuitState::Closed,
            state_atomic,
            last_state_change: Instant::now(),
            consecutive_failure_count: 0,
            consecutive_success_count: 0,
            opened_at: None,
        }
    }

    pub fn state(&self) -> CircuitState {
        self.state
    }

    /// Returns a snapshot of the current circuit breaker counters.
    pub fn metrics(&self) -> CircuitMetrics {
        CircuitMetrics {
            state: self.state,
            consecutive_failure_count: self.consecutive_failure_count,
            consecutive_success_count: self.consecutive_success_count,
            time_since_state_change: self.last_state_change.elapsed(),
        }
    }

    pub fn record_success(&mut self, config: &CircuitBreakerConfig<impl Sized, impl Sized>) {
        config
            .event_listeners
            .emit(&CircuitBreakerEvent::SuccessRecorded {
                pattern_name: config.name.clone(),
                timestamp: Instant::now(),
                state: self.state,
            });

        #[cfg(feature = "metrics")]
        counter!("circuitbreaker_calls_total", "circuitbreaker" => config.name.clone(), "outcome" => "success").increment(1);

        match self.state {
            CircuitState::HalfOpen => {
                self.consecutive_success_count += 1;
                if self.consecutive_success_count >= config.recovery_threshold {
                    self.transition_to(CircuitState::Closed, config);
                }
            }
            CircuitState::Closed => {
                self.consecutive_failure_count = 0;
            }
            CircuitState::Open => {}
        }
    }

    pub fn record_failure(&mut self, config: &CircuitBreakerConfig<impl Sized, impl Sized>) {
        config
            .event_listeners
            .emit(&CircuitBreakerEvent::FailureRecorded {
                pattern_name: config.name.clone(),
                timestamp: Instant::now(),
                state: self.state,
            });

        #[cfg(feature = "metrics")]
        counter!("circuitbreaker_calls_total", "circuitbreaker" => config.name.clone(), "outcome" => "failure").increment(1);

        match self.state {
            CircuitState::HalfOpen => {
                self.transition_to(CircuitState::Open, config);
            }
            CircuitState::Closed => {
                self.consecutive_failure_count += 1;
                if self.consecutive_failure_count >= config.failure_threshold {
                    self.transition_to(CircuitState::Open, config);
                }
            }
            CircuitState::Open => {}
        }
    }

    pub fn try_acquire(&mut self, config: &CircuitBreakerConfig<impl Sized, impl Sized>) -> bool {
        match self.state {
            CircuitState::Closed => {
                config
                    .event_listeners
                    .emit(&CircuitBreakerEvent::CallPermitted {
                        pattern_name: config.name.clone(),
                        timestamp: Instant::now(),
                        state: self.state,
                    });
                true
            }
            CircuitState::Open => {
                let recovery_due = self
                    .opened_at
                    .map(|opened_at| opened_at.elapsed() >= config.recovery_time)
                    .unwrap_or(false);

                if recovery_due {
                    self.transition_to(CircuitState::HalfOpen, config);
                    config
                        .event_listeners
                        .emit(&CircuitBreakerEvent::CallPermitted {
                            pattern_name: config.name.clone(),
                            timestamp: Instant::now(),
                            state: self.state,
                        });
                    true
                } else {
                    config
                        .event_listeners
                        .emit(&CircuitBreakerEvent::CallRejected {
                            pattern_name: config.name.clone(),
                            timestamp: Instant::now(),
                        });
                    false
                }
            }
            CircuitState::HalfOpen => {
                config
                    .event_listeners
                    .emit(&CircuitBreakerEvent::CallPermitted {
                        pattern_name: config.name.clone(),
                        timestamp: Instant::now(),
                        state: self.state,
                    });
                true
            }
        }
    }

    pub fn force_open(&mut self, config: &CircuitBreakerConfig<impl Sized, impl Sized>) {
        self.transition_to(CircuitState::Open, config);
    }

    pub fn force_closed(&mut self, config: &CircuitBreakerConfig<impl Sized, impl Sized>) {
        self.transition_to(CircuitState::Closed, config);
    }

    pub fn reset(&mut self, config: &CircuitBreakerConfig<impl Sized, impl Sized>) {
        self.transition_to(CircuitState::Closed, config);
    }

    fn transition_to(
        &mut self,
        state: CircuitState,
        config: &CircuitBreakerConfig<impl Sized, impl Sized>,
    ) {
        if self.state == state {
            return;
        }

        let from_state = self.state;

        config
            .event_listeners
            .emit(&CircuitBreakerEvent::StateTransition {
                pattern_name: config.name.clone(),
                timestamp: Instant::now(),
                from_state,
                to_state: state,
            });

        #[cfg(feature = "tracing")]
        tracing::info!(from = ?from_state, to = ?state, "Circuit state transition");

        #[cfg(feature = "metrics")]
        {
            counter!(
                "circuitbreaker_transitions_total",
                "circuitbreaker" => config.name.clone(),
                "from" => match from_state {
                    CircuitState::Closed => "Closed",
                    CircuitState::Open => "Open",
                    CircuitState::HalfOpen => "HalfOpen",
                },
                "to" => match state {
                    CircuitState::Closed => "Closed",
                    CircuitState::Open => "Open",
                    CircuitState::HalfOpen => "HalfOpen",
                }
            )
            .increment(1);

            gauge!("circuitbreaker_state", "circuitbreaker" => config.name.clone(), "state" => match state {
                CircuitState::Closed => "Closed",
                CircuitState::Open => "Open",
                CircuitState::HalfOpen => "HalfOpen",
            })
            .set(1.0);
        }

        self.state = state;
        self.state_atomic.store(state as u8, Ordering::Release);
        self.last_state_change = Instant::now();
        self.consecutive_failure_count = 0;
        self.consecutive_success_count = 0;
        self.opened_at = if state == CircuitState::Open {
            Some(Instant::now())
        } else {
            None
        };
    }
}
