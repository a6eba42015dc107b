use crate::config::FailFastConfig;
use crate::events::FailFastEvent;
#[cfg(feature = "metrics")]
use metrics::counter;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// The mutable state behind a fail-fast gate.
///
/// Unlike the circuit breaker, there is no automatic recovery: once open,
/// the gate stays open until `close()` is called explicitly. `is_open_atomic`
/// mirrors `open` for lock-free reads outside the call path.
pub(crate) struct Gate {
    open: bool,
    is_open_atomic: std::sync::Arc<AtomicBool>,
    consecutive_failure_count: usize,
}

impl Default for Gate {
    fn default() -> Self {
        Self::new_with_atomic(std::sync::Arc::new(AtomicBool::new(false)))
    }
}

impl Gate {
    #[cfg(test)]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn new_with_atomic(is_open_atomic: std::sync::Arc<AtomicBool>) -> Self {
        Self {
            open: false,
            is_open_atomic,
            consecutive_failure_count: 0,
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.open
    }

    pub(crate) fn consecutive_failure_count(&self) -> usize {
        self.consecutive_failure_count
    }

    /// Opens the gate, recording `Opened` and the associated metrics/tracing.
    pub(crate) fn open(&mut self, config: &FailFastConfig<impl Sized, impl Sized, impl Sized>) {
        if self.open {
            return;
        }
        self.open = true;
        self.is_open_atomic.store(true, Ordering::Release);

        config.event_listeners.emit(&FailFastEvent::Opened {
            pattern_name: config.name.clone(),
            timestamp: Instant::now(),
        });

        #[cfg(feature = "tracing")]
        tracing::info!(gate = %config.name, "fail-fast gate opened");

        #[cfg(feature = "metrics")]
        counter!("failfast_opened_total", "failfast" => config.name.clone()).increment(1);
    }

    /// Closes the gate and resets the consecutive failure count.
    pub(crate) fn close(&mut self, config: &FailFastConfig<impl Sized, impl Sized, impl Sized>) {
        self.open = false;
        self.is_open_atomic.store(false, Ordering::Release);
        self.consecutive_failure_count = 0;

        config.event_listeners.emit(&FailFastEvent::Closed {
            pattern_name: config.name.clone(),
            timestamp: Instant::now(),
        });

        #[cfg(feature = "tracing")]
        tracing::info!(gate = %config.name, "fail-fast gate closed");
    }

    /// Checks whether a call is permitted given the predicate and current
    /// state, emitting `CallRejected` if not.
    pub(crate) fn try_acquire<Req>(
        &mut self,
        req: &Req,
        config: &FailFastConfig<Req, impl Sized, impl Sized>,
    ) -> bool {
        if self.open {
            config.event_listeners.emit(&FailFastEvent::CallRejected {
                pattern_name: config.name.clone(),
                timestamp: Instant::now(),
            });
            return false;
        }

        if let Some(predicate) = &config.predicate {
            if predicate(req) {
                self.open(config);
                config.event_listeners.emit(&FailFastEvent::CallRejected {
                    pattern_name: config.name.clone(),
                    timestamp: Instant::now(),
                });
                return false;
            }
        }

        true
    }

    /// Records a success, resetting the consecutive failure count.
    pub(crate) fn record_success(&mut self, config: &FailFastConfig<impl Sized, impl Sized, impl Sized>) {
        self.consecutive_failure_count = 0;

        config.event_listeners.emit(&FailFastEvent::SuccessRecorded {
            pattern_name: config.name.clone(),
            timestamp: Instant::now(),
        });

        #[cfg(feature = "metrics")]
        counter!("failfast_calls_total", "failfast" => config.name.clone(), "outcome" => "success").increment(1);
    }

    /// Records a watched failure, opening the gate once `failure_threshold`
    /// consecutive failures have accumulated.
    pub(crate) fn record_failure(&mut self, config: &FailFastConfig<impl Sized, impl Sized, impl Sized>) {
        self.consecutive_failure_count += 1;

        config.event_listeners.emit(&FailFastEvent::FailureRecorded {
            pattern_name: config.name.clone(),
            timestamp: Instant::now(),
            consecutive_failure_count: self.consecutive_failure_count,
        });

        #[cfg(feature = "metrics")]
        counter!("failfast_calls_total", "failfast" => config.name.clone(), "outcome" => "failure").increment(1);

        if let Some(threshold) = config.failure_threshold {
            if self.consecutive_failure_count >= threshold {
                self.open(config);
            }
        }
    }
}
