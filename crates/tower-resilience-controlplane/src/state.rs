//! Shared state handed to every control-plane route.

use metrics_util::debugging::{DebuggingRecorder, Snapshotter};
use std::sync::{Arc, OnceLock};
use std::time::SystemTime;
use tower_resilience_core::registry::{ConfigStore, PatternRegistry};

/// Installs a process-global [`DebuggingRecorder`] the first time it's
/// requested and returns a [`Snapshotter`] over it.
///
/// `metrics::set_global_recorder` may only succeed once per process; a
/// second call from, say, a second [`ControlPlaneState`] in the same binary
/// returns a clone of the snapshotter already installed rather than erroring.
fn global_snapshotter() -> Snapshotter {
    static RECORDER: OnceLock<DebuggingRecorder> = OnceLock::new();
    let recorder = RECORDER.get_or_init(DebuggingRecorder::default);
    let snapshotter = recorder.snapshotter();
    let _ = metrics::set_global_recorder(recorder);
    snapshotter
}

/// State threaded through the control-plane [`axum::Router`](crate::router).
#[derive(Clone)]
pub struct ControlPlaneState {
    pub(crate) registry: Arc<PatternRegistry>,
    pub(crate) config_store: Arc<ConfigStore>,
    pub(crate) snapshotter: Snapshotter,
    pub(crate) started_at: SystemTime,
}

impl ControlPlaneState {
    /// Builds state over an existing registry and config store, installing
    /// the global metrics recorder that backs `/metrics` if one isn't
    /// already installed.
    pub fn new(registry: Arc<PatternRegistry>, config_store: Arc<ConfigStore>) -> Self {
        Self {
            registry,
            config_store,
            snapshotter: global_snapshotter(),
            started_at: SystemTime::now(),
        }
    }

    /// Builds state with a fresh, empty registry and config store.
    pub fn fresh() -> Self {
        Self::new(Arc::new(PatternRegistry::new()), Arc::new(ConfigStore::new()))
    }

    /// The registry this state was built over, so callers can register
    /// their own managers before mounting the router.
    pub fn registry(&self) -> &Arc<PatternRegistry> {
        &self.registry
    }

    /// The config store this state was built over.
    pub fn config_store(&self) -> &Arc<ConfigStore> {
        &self.config_store
    }
}
