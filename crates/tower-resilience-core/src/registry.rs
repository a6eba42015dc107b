//! Controller registry: a weak-ref index of live policy instances plus a
//! layered configuration store (YAML defaults + runtime overrides).
//!
//! Every policy manager in this workspace implements [`PolicyHandle`] and
//! registers itself with a [`PatternRegistry`] at construction time. The
//! registry never keeps a manager alive — it holds `Weak<dyn PolicyHandle>`
//! and drops stale entries opportunistically on read, mirroring the
//! weak-reference discipline a garbage-collected implementation gets for
//! free.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use std::time::SystemTime;

/// Uniform, object-safe view over any policy manager, used by the
/// controller registry and control plane regardless of the manager's
/// concrete config/event types.
pub trait PolicyHandle: Send + Sync {
    /// The instance name (used as the registry key within its pattern type).
    fn name(&self) -> &str;
    /// The pattern type tag, e.g. `"retry"`, `"circuitbreaker"`, `"ratelimit"`.
    fn pattern_type(&self) -> &'static str;
    /// Whether the manager currently admits calls.
    fn enabled(&self) -> bool;
    /// Enables or disables the manager.
    fn set_enabled(&self, enabled: bool);
    /// Applies a partial configuration update. Keys absent from `update` are
    /// preserved. Returns `Err` with a description if a key is not
    /// recognized or a value fails validation.
    fn update_config(&self, update: &HashMap<String, String>) -> Result<(), String>;
    /// Snapshots the manager's current configuration as key/value pairs.
    fn current_config(&self) -> HashMap<String, String>;
}

/// A registered instance: a weak handle plus metadata captured at
/// registration time.
pub struct PatternRecord {
    handle: Weak<dyn PolicyHandle>,
    /// Free-form metadata supplied at registration (e.g. module path).
    pub metadata: HashMap<String, String>,
    /// When this instance was registered.
    pub registered_at: SystemTime,
}

impl PatternRecord {
    /// Upgrades the weak handle, returning `None` if the manager was dropped.
    pub fn upgrade(&self) -> Option<Arc<dyn PolicyHandle>> {
        self.handle.upgrade()
    }
}

/// Pattern-type keyed index of live policy instances, held weakly.
#[derive(Default)]
pub struct PatternRegistry {
    inner: Mutex<HashMap<&'static str, HashMap<String, PatternRecord>>>,
}

impl PatternRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a manager under its pattern type and name. A second
    /// registration with the same (pattern_type, name) replaces the first.
    pub fn register(&self, handle: &Arc<dyn PolicyHandle>, metadata: HashMap<String, String>) {
        let pattern_type = handle.pattern_type();
        let name = handle.name().to_string();
        let record = PatternRecord {
            handle: Arc::downgrade(handle),
            metadata,
            registered_at: SystemTime::now(),
        };
        let mut inner = self.inner.lock().unwrap();
        inner.entry(pattern_type).or_default().insert(name, record);
    }

    /// Lists live instances, optionally filtered by pattern type. Dropped
    /// managers are compacted out as a side effect.
    pub fn list(
        &self,
        pattern_type: Option<&str>,
    ) -> Vec<(&'static str, String, SystemTime, HashMap<String, String>)> {
        let mut inner = self.inner.lock().unwrap();
        let mut out = Vec::new();
        for (pt, names) in inner.iter_mut() {
            if let Some(filter) = pattern_type {
                if *pt != filter {
                    continue;
                }
            }
            names.retain(|name, record| match record.upgrade() {
                Some(_) => {
                    out.push((*pt, name.clone(), record.registered_at, record.metadata.clone()));
                    true
                }
                None => false,
            });
        }
        out
    }

    /// Looks up a live manager by (pattern_type, name).
    pub fn get(&self, pattern_type: &str, name: &str) -> Option<Arc<dyn PolicyHandle>> {
        let mut inner = self.inner.lock().unwrap();
        let names = inner.get_mut(pattern_type)?;
        let record = names.get(name)?;
        match record.upgrade() {
            Some(handle) => Some(handle),
            None => {
                names.remove(name);
                None
            }
        }
    }

    /// Applies a runtime config update to a live manager. Returns `Err` if
    /// the (pattern_type, name) is not found among live instances.
    pub fn update_config(
        &self,
        pattern_type: &str,
        name: &str,
        update: &HashMap<String, String>,
    ) -> Result<(), RegistryError> {
        let handle = self
            .get(pattern_type, name)
            .ok_or(RegistryError::NotFound)?;
        handle
            .update_config(update)
            .map_err(RegistryError::InvalidUpdate)
    }
}

/// Errors returned by [`PatternRegistry`] operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    /// No live instance matches the given (pattern_type, name).
    #[error("no live instance registered under that pattern type and name")]
    NotFound,
    /// The manager rejected the update.
    #[error("invalid config update: {0}")]
    InvalidUpdate(String),
}

/// Layered configuration: YAML-backed defaults plus runtime overrides.
///
/// Defaults are keyed `pattern_type -> name-or-"default" -> parameter-map`;
/// overrides are keyed `"{pattern_type}:{name}"`. Explicit constructor
/// arguments always win over both; overrides win over defaults.
#[derive(Default)]
pub struct ConfigStore {
    defaults: HashMap<String, HashMap<String, HashMap<String, String>>>,
    overrides: Mutex<HashMap<String, HashMap<String, String>>>,
}

impl ConfigStore {
    /// Creates an empty config store (no defaults loaded).
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads defaults from a parsed YAML mapping
    /// `pattern_type -> name -> parameter-map`.
    pub fn with_defaults(
        defaults: HashMap<String, HashMap<String, HashMap<String, String>>>,
    ) -> Self {
        Self {
            defaults,
            overrides: Mutex::new(HashMap::new()),
        }
    }

    /// Resolves the default config-map for `pattern_type`/`name`, falling
    /// back to the `"default"` name within that pattern type.
    pub fn defaults_for(&self, pattern_type: &str, name: &str) -> HashMap<String, String> {
        let by_name = match self.defaults.get(pattern_type) {
            Some(m) => m,
            None => return HashMap::new(),
        };
        by_name
            .get(name)
            .or_else(|| by_name.get("default"))
            .cloned()
            .unwrap_or_default()
    }

    /// Records a runtime override for `pattern_type`/`name`, merging over
    /// any existing override (new keys win, old keys not present in
    /// `update` are preserved).
    pub fn put_override(&self, pattern_type: &str, name: &str, update: HashMap<String, String>) {
        let key = format!("{pattern_type}:{name}");
        let mut overrides = self.overrides.lock().unwrap();
        overrides.entry(key).or_default().extend(update);
    }

    /// Returns the current runtime override for `pattern_type`/`name`, if any.
    pub fn get_override(&self, pattern_type: &str, name: &str) -> Option<HashMap<String, String>> {
        let key = format!("{pattern_type}:{name}");
        self.overrides.lock().unwrap().get(&key).cloned()
    }

    /// Resolves the effective config for `pattern_type`/`name`: defaults
    /// overlaid with the runtime override, if any.
    pub fn effective_config(&self, pattern_type: &str, name: &str) -> HashMap<String, String> {
        let mut cfg = self.defaults_for(pattern_type, name);
        if let Some(over) = self.get_override(pattern_type, name) {
            cfg.extend(over);
        }
        cfg
    }

    /// Snapshots every loaded default, keyed `pattern_type -> name -> params`.
    /// Used by surfaces (e.g. a control-plane HTTP API) that need to display
    /// the full set of configured defaults rather than resolve one instance
    /// at a time.
    pub fn snapshot_defaults(&self) -> HashMap<String, HashMap<String, HashMap<String, String>>> {
        self.defaults.clone()
    }

    /// Snapshots every runtime override currently recorded, keyed
    /// `"{pattern_type}:{name}" -> params`.
    pub fn snapshot_overrides(&self) -> HashMap<String, HashMap<String, String>> {
        self.overrides.lock().unwrap().clone()
    }
}
