//! Core admission logic shared by the `tower::Service` wrapper and the bare
//! scoped-guard entry point.

use crate::config::BulkheadConfig;
use crate::error::BulkheadError;
use crate::events::BulkheadEvent;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

#[cfg(feature = "metrics")]
use metrics::{counter, gauge};

/// Owns the concurrency semaphore and wait-queue accounting for a single
/// bulkhead instance. Shared between the `Bulkhead<S>` tower service and
/// anyone acquiring a permit directly via [`BulkheadLimiter::acquire`].
pub(crate) struct BulkheadLimiter {
    semaphore: Arc<Semaphore>,
    waiting_count: Arc<AtomicUsize>,
    pub(crate) config: Arc<BulkheadConfig>,
}

/// A permit granting one slot of the bulkhead's concurrency budget. Releases
/// the slot when dropped.
pub struct BulkheadPermit {
    _permit: OwnedSemaphorePermit,
}

/// A bulkhead usable as a scoped guard, independent of any `tower::Service`.
///
/// ```rust
/// use tower_resilience_bulkhead::BulkheadConfig;
///
/// # async fn example() {
/// let bulkhead = BulkheadConfig::builder()
///     .max_concurrent_calls(10)
///     .build_standalone();
///
/// let _permit = bulkhead.acquire().await.unwrap();
/// // protected section runs here; the permit releases on drop
/// # }
/// ```
#[derive(Clone)]
pub struct BulkheadGuard {
    limiter: Arc<BulkheadLimiter>,
}

impl BulkheadGuard {
    pub(crate) fn new(config: BulkheadConfig) -> Self {
        Self {
            limiter: Arc::new(BulkheadLimiter::new(Arc::new(config))),
        }
    }

    /// Acquires a permit, waiting if the bulkhead is at capacity and the
    /// wait queue has room, or failing immediately with
    /// [`BulkheadError::BulkheadFull`] otherwise.
    pub async fn acquire(&self) -> Result<BulkheadPermit, BulkheadError> {
        self.limiter.acquire().await
    }
}

impl BulkheadLimiter {
    pub(crate) fn new(config: Arc<BulkheadConfig>) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(config.max_concurrent_calls)),
            waiting_count: Arc::new(AtomicUsize::new(0)),
            config,
        }
    }

    pub(crate) fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Admits a call: reserves a wait-queue slot if the bulkhead is already
    /// at capacity, enforcing `max_waiting`, then waits (optionally bounded
    /// by `max_wait_duration`) for a concurrency permit. FIFO because
    /// `tokio::sync::Semaphore` grants queued waiters permits in arrival order.
    pub(crate) async fn acquire(&self) -> Result<BulkheadPermit, BulkheadError> {
        let config = &self.config;
        let needs_to_wait = self.semaphore.available_permits() == 0;
        let mut reserved_slot = false;

        if needs_to_wait {
            if let Some(max_waiting) = config.max_waiting {
                let reserved = self
                    .waiting_count
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                        if current < max_waiting {
                            Some(current + 1)
                        } else {
                            None
                        }
                    })
                    .is_ok();

                if !reserved {
                    config.event_listeners.emit(&BulkheadEvent::CallRejected {
                        pattern_name: config.name.clone(),
                        timestamp: Instant::now(),
                        max_concurrent_calls: config.max_concurrent_calls,
                    });

                    #[cfg(feature = "metrics")]
                    counter!("bulkhead_calls_rejected_total", "bulkhead" => config.name.clone())
                        .increment(1);

                    return Err(BulkheadError::BulkheadFull {
                        max_concurrent_calls: config.max_concurrent_calls,
                    });
                }

                reserved_slot = true;
                config.event_listeners.emit(&BulkheadEvent::CallQueued {
                    pattern_name: config.name.clone(),
                    timestamp: Instant::now(),
                    waiting_calls: self.waiting_count.load(Ordering::SeqCst),
                });
            }
        }

        enum AcquireFailure {
            TimedOut,
            Closed,
        }

        let acquire_result = match config.max_wait_duration {
            Some(duration) => match tokio::time::timeout(duration, self.semaphore.clone().acquire_owned()).await {
                Ok(Ok(permit)) => Ok(permit),
                Ok(Err(_closed)) => Err(AcquireFailure::Closed),
                Err(_elapsed) => Err(AcquireFailure::TimedOut),
            },
            None => self
                .semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_closed| AcquireFailure::Closed),
        };

        if reserved_slot {
            self.waiting_count.fetch_sub(1, Ordering::SeqCst);
        }

        let permit = match acquire_result {
            Ok(permit) => permit,
            Err(failure) => {
                config.event_listeners.emit(&BulkheadEvent::CallRejected {
                    pattern_name: config.name.clone(),
                    timestamp: Instant::now(),
                    max_concurrent_calls: config.max_concurrent_calls,
                });

                #[cfg(feature = "metrics")]
                counter!("bulkhead_calls_rejected_total", "bulkhead" => config.name.clone())
                    .increment(1);

                return Err(match failure {
                    AcquireFailure::TimedOut => BulkheadError::Timeout,
                    AcquireFailure::Closed => BulkheadError::BulkheadFull {
                        max_concurrent_calls: config.max_concurrent_calls,
                    },
                });
            }
        };

        let concurrent_calls = config.max_concurrent_calls - self.semaphore.available_permits();
        config.event_listeners.emit(&BulkheadEvent::CallPermitted {
            pattern_name: config.name.clone(),
            timestamp: Instant::now(),
            concurrent_calls,
        });

        #[cfg(feature = "metrics")]
        {
            counter!("bulkhead_calls_permitted_total", "bulkhead" => config.name.clone())
                .increment(1);
            gauge!("bulkhead_concurrent_calls", "bulkhead" => config.name.clone())
                .set(concurrent_calls as f64);
        }

        Ok(BulkheadPermit { _permit: permit })
    }
}
