//! Fail-fast pattern for Tower services.
//!
//! A fail-fast gate tracks consecutive watched failures and, once a
//! threshold is reached, rejects every subsequent call immediately without
//! invoking the inner service. Unlike a circuit breaker there is no
//! automatic recovery: the gate stays open until [`FailFast::close`] is
//! called explicitly. An optional predicate, evaluated against each request
//! before the inner service runs, can also open the gate on demand.
//!
//! ## Basic Example
//!
//! ```rust
//! use tower_resilience_failfast::{FailFastLayer, FailFast};
//! use tower::service_fn;
//!
//! # async fn example() {
//! let layer = FailFastLayer::<String, String, ()>::builder()
//!     .failure_threshold(5)
//!     .build();
//!
//! let svc = service_fn(|req: String| async move {
//!     Ok::<String, ()>(req)
//! });
//! let mut service: FailFast<_, String, String, ()> = layer.layer(svc);
//! # }
//! ```
//!
//! ## Predicate Gate
//!
//! Open the gate based on the request itself, independent of failure counting:
//!
//! ```rust
//! use tower_resilience_failfast::FailFastLayer;
//! use tower::service_fn;
//!
//! # async fn example() {
//! let layer = FailFastLayer::<i32, String, ()>::builder()
//!     .predicate(|req: &i32| *req < 0)
//!     .build();
//!
//! let svc = service_fn(|req: i32| async move {
//!     Ok::<String, ()>(req.to_string())
//! });
//! let mut service = layer.layer(svc);
//! # }
//! ```
//!
//! ## Manual Control
//!
//! ```rust
//! use tower_resilience_failfast::FailFastLayer;
//! use tower::service_fn;
//!
//! # async fn example() {
//! let layer = FailFastLayer::<String, String, ()>::builder().build();
//! let service = layer.layer(service_fn(|req: String| async move { Ok::<_, ()>(req) }));
//!
//! service.open().await;
//! assert!(service.is_open());
//! service.close().await;
//! # }
//! ```
//!
//! ## Features
//! - Cumulative consecutive-failure counter with no automatic recovery
//! - Optional predicate evaluated against the request before the call
//! - Watched-exception-set style failure classification
//! - Event system for observability
//! - Manual gate control (`open`, `close`)
//! - Sync state inspection with `is_open_sync()`
//! - Metrics integration via the `metrics` feature
//! - Tracing support via the `tracing` feature
//!
//! ## Feature Flags
//! - `metrics`: enables metrics collection using the `metrics` crate
//! - `tracing`: enables logging and tracing using the `tracing` crate

use futures::future::BoxFuture;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::Mutex;
use tower::Service;

pub use config::{FailFastConfig, FailFastConfigBuilder};
pub use error::FailFastError;
pub use events::FailFastEvent;
pub use layer::FailFastLayer;

mod config;
mod error;
mod events;
mod gate;
mod layer;

use gate::Gate;

pub(crate) type FailureClassifier<Res, Err> = dyn Fn(&Result<Res, Err>) -> bool + Send + Sync;
pub(crate) type SharedFailureClassifier<Res, Err> = Arc<FailureClassifier<Res, Err>>;

pub(crate) type Predicate<Req> = dyn Fn(&Req) -> bool + Send + Sync;
pub(crate) type SharedPredicate<Req> = Arc<Predicate<Req>>;

/// A Tower Service that applies fail-fast gating to an inner service.
pub struct FailFast<S, Req, Res, Err> {
    inner: S,
    gate: Arc<Mutex<Gate>>,
    is_open_atomic: Arc<std::sync::atomic::AtomicBool>,
    config: Arc<FailFastConfig<Req, Res, Err>>,
}

impl<S, Req, Res, Err> FailFast<S, Req, Res, Err> {
    /// Creates a new `FailFast` wrapping the given service and configuration.
    pub(crate) fn new(inner: S, config: Arc<FailFastConfig<Req, Res, Err>>) -> Self {
        let is_open_atomic = Arc::new(std::sync::atomic::AtomicBool::new(false));
        Self {
            inner,
            gate: Arc::new(Mutex::new(Gate::new_with_atomic(Arc::clone(
                &is_open_atomic,
            )))),
            is_open_atomic,
            config,
        }
    }

    /// Opens the gate manually.
    pub async fn open(&self) {
        let mut gate = self.gate.lock().await;
        gate.open(&self.config);
    }

    /// Closes the gate manually, clearing the consecutive failure count.
    pub async fn close(&self) {
        let mut gate = self.gate.lock().await;
        gate.close(&self.config);
    }

    /// Returns whether the gate is currently open.
    pub async fn is_open_async(&self) -> bool {
        let gate = self.gate.lock().await;
        gate.is_open()
    }

    /// Returns whether the gate is currently open without requiring async context.
    ///
    /// Safe to call from sync code (e.g., health checks). Reads from an
    /// `AtomicBool` kept synchronized with the actual state.
    pub fn is_open(&self) -> bool {
        self.is_open_atomic
            .load(std::sync::atomic::Ordering::Acquire)
    }
}

impl<S, Req, Res, Err> Service<Req> for FailFast<S, Req, Res, Err>
where
    S: Service<Req, Response = Res, Error = Err> + Clone + Send + 'static,
    S::Future: Send + 'static,
    Res: Send + 'static,
    Err: Send + 'static,
    Req: Send + 'static,
{
    type Response = Res;
    type Error = FailFastError<Err>;
    type Future = BoxFuture<'static, Result<Res, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(FailFastError::Inner)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let config = Arc::clone(&self.config);
        let gate = Arc::clone(&self.gate);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let permitted = {
                let mut gate = gate.lock().await;
                gate.try_acquire(&req, &config)
            };

            if !permitted {
                return Err(FailFastError::Open);
            }

            let result = inner.call(req).await;

            let mut gate = gate.lock().await;
            if (config.failure_classifier)(&result) {
                gate.record_failure(&config);
            } else {
                gate.record_success(&config);
            }

            result.map_err(FailFastError::Inner)
        })
    }
}
