//! HTTP control plane for the resilience pattern registry.
//!
//! Mounts a read/write `axum` surface over [`tower_resilience_core::registry::PatternRegistry`]
//! and [`tower_resilience_core::registry::ConfigStore`]: health/liveness probes, a pattern
//! directory, live config get/put, metrics snapshots, and enable/disable control.
//!
//! Kept in its own crate so that the core policy crates never pull in an HTTP
//! framework - this surface is glue over them, not part of them.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tower_resilience_controlplane::ControlPlaneState;
//! use tower_resilience_core::registry::{ConfigStore, PatternRegistry};
//!
//! # async fn example() {
//! let state = ControlPlaneState::new(
//!     Arc::new(PatternRegistry::new()),
//!     Arc::new(ConfigStore::new()),
//! );
//! let app = tower_resilience_controlplane::router(state);
//! # let _ = app;
//! # }
//! ```

mod error;
mod handlers;
mod state;

pub use error::ApiError;
pub use state::ControlPlaneState;

use axum::routing::{get, post};
use axum::Router;

/// Default path prefix every route is nested under, matching the
/// `/failsafe` default of the control-plane contract.
pub const DEFAULT_PREFIX: &str = "/failsafe";

/// Builds the control-plane router under [`DEFAULT_PREFIX`].
pub fn router(state: ControlPlaneState) -> Router {
    router_with_prefix(DEFAULT_PREFIX, state)
}

/// Builds the control-plane router nested under a custom prefix.
pub fn router_with_prefix(prefix: &str, state: ControlPlaneState) -> Router {
    let routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/liveness", get(handlers::liveness))
        .route("/patterns", get(handlers::list_patterns))
        .route("/config", get(handlers::get_config_all))
        .route(
            "/config/:pattern_type/:name",
            get(handlers::get_config_one).put(handlers::put_config),
        )
        .route("/metrics", get(handlers::get_metrics))
        .route(
            "/metrics/:pattern_type/:name",
            get(handlers::get_metrics_for).delete(handlers::delete_metrics_for),
        )
        .route(
            "/control/:pattern_type/:name/:action",
            post(handlers::control_action),
        )
        .with_state(state);

    Router::new().nest(prefix, routes)
}
