//! Feature-toggle pattern for Tower services.
//!
//! Gates an inner service behind a boolean flag combined with an optional
//! predicate over the request. When the flag is off, or the predicate
//! returns `false`, the call is rejected with [`FeatureToggleError::Disabled`]
//! without ever reaching the inner service. The flag can be flipped at
//! runtime via [`FeatureToggle::enable`] / [`FeatureToggle::disable`].
//!
//! ## Basic Example
//!
//! ```rust
//! use tower_resilience_featuretoggle::{FeatureToggleLayer, FeatureToggle};
//! use tower::service_fn;
//!
//! # async fn example() {
//! let layer = FeatureToggleLayer::<String>::builder()
//!     .enabled(true)
//!     .build();
//!
//! let svc = service_fn(|req: String| async move {
//!     Ok::<String, ()>(req)
//! });
//! let mut service: FeatureToggle<_, String> = layer.layer(svc);
//! # }
//! ```
//!
//! ## Predicate Gate
//!
//! ```rust
//! use tower_resilience_featuretoggle::FeatureToggleLayer;
//! use tower::service_fn;
//!
//! # async fn example() {
//! let layer = FeatureToggleLayer::<i32>::builder()
//!     .predicate(|req: &i32| *req % 2 == 0)
//!     .build();
//!
//! let svc = service_fn(|req: i32| async move {
//!     Ok::<String, ()>(req.to_string())
//! });
//! let mut service = layer.layer(svc);
//! # }
//! ```
//!
//! ## Runtime Control
//!
//! ```rust
//! use tower_resilience_featuretoggle::FeatureToggleLayer;
//! use tower::service_fn;
//!
//! # async fn example() {
//! let layer = FeatureToggleLayer::<String>::builder().enabled(false).build();
//! let service = layer.layer(service_fn(|req: String| async move { Ok::<_, ()>(req) }));
//!
//! assert!(!service.is_enabled());
//! service.enable();
//! assert!(service.is_enabled());
//! # }
//! ```
//!
//! ## Features
//! - Boolean flag with an optional predicate over the request
//! - Runtime toggling via `enable()` / `disable()`, visible to every clone
//! - Event system for observability
//! - Metrics integration via the `metrics` feature
//! - Tracing support via the `tracing` feature
//!
//! ## Feature Flags
//! - `metrics`: enables metrics collection using the `metrics` crate
//! - `tracing`: enables logging and tracing using the `tracing` crate

use futures::future::BoxFuture;
#[cfg(feature = "metrics")]
use metrics::counter;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;
use tower::Service;

pub use config::{FeatureToggleConfig, FeatureToggleConfigBuilder};
pub use error::FeatureToggleError;
pub use events::FeatureToggleEvent;
pub use layer::FeatureToggleLayer;

mod config;
mod error;
mod events;
mod layer;

pub(crate) type Predicate<Req> = dyn Fn(&Req) -> bool + Send + Sync;
pub(crate) type SharedPredicate<Req> = Arc<Predicate<Req>>;

/// A Tower Service that gates an inner service behind a feature flag.
pub struct FeatureToggle<S, Req> {
    inner: S,
    config: Arc<FeatureToggleConfig<Req>>,
}

impl<S, Req> FeatureToggle<S, Req> {
    /// Creates a new `FeatureToggle` wrapping the given service and configuration.
    pub(crate) fn new(inner: S, config: Arc<FeatureToggleConfig<Req>>) -> Self {
        Self { inner, config }
    }

    /// Enables the flag. Visible immediately to every clone of this service.
    pub fn enable(&self) {
        self.config.enabled.store(true, Ordering::Release);
        self.config.event_listeners.emit(&FeatureToggleEvent::FeatureEnabled {
            pattern_name: self.config.name.clone(),
            timestamp: Instant::now(),
        });
    }

    /// Disables the flag. Visible immediately to every clone of this service.
    pub fn disable(&self) {
        self.config.enabled.store(false, Ordering::Release);
        self.config.event_listeners.emit(&FeatureToggleEvent::FeatureDisabled {
            pattern_name: self.config.name.clone(),
            timestamp: Instant::now(),
        });
    }

    /// Returns whether the flag is currently on. Does not evaluate the predicate.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled.load(Ordering::Acquire)
    }
}

impl<S: Clone, Req> Clone for FeatureToggle<S, Req> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S, Req> Service<Req> for FeatureToggle<S, Req>
where
    S: Service<Req> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Response: Send + 'static,
    S::Error: Send + 'static,
    Req: Send + 'static,
{
    type Response = S::Response;
    type Error = FeatureToggleError<S::Error>;
    type Future = BoxFuture<'static, Result<S::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(FeatureToggleError::Inner)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let config = Arc::clone(&self.config);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let allowed = config.enabled.load(Ordering::Acquire)
                && config
                    .predicate
                    .as_ref()
                    .map(|p| p(&req))
                    .unwrap_or(true);

            if !allowed {
                #[cfg(feature = "metrics")]
                counter!("featuretoggle_calls_total", "featuretoggle" => config.name.clone(), "outcome" => "disabled").increment(1);

                config.event_listeners.emit(&FeatureToggleEvent::FeatureDisabled {
                    pattern_name: config.name.clone(),
                    timestamp: Instant::now(),
                });
                return Err(FeatureToggleError::Disabled);
            }

            #[cfg(feature = "metrics")]
            counter!("featuretoggle_calls_total", "featuretoggle" => config.name.clone(), "outcome" => "enabled").increment(1);

            config.event_listeners.emit(&FeatureToggleEvent::FeatureEnabled {
                pattern_name: config.name.clone(),
                timestamp: Instant::now(),
            });

            inner.call(req).await.map_err(FeatureToggleError::Inner)
        })
    }
}
