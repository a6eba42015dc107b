//! Route handlers for the control-plane HTTP surface.

use crate::error::ApiError;
use crate::state::ControlPlaneState;
use axum::extract::{Path, Query, State};
use axum::Json;
use metrics_util::debugging::DebugValue;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::SystemTime;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tower_resilience_core::registry::PolicyHandle;

/// The crate's own version, reported by `/health`.
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn rfc3339_timestamp() -> String {
    rfc3339(SystemTime::now())
}

fn rfc3339(at: SystemTime) -> String {
    OffsetDateTime::from(at)
        .format(&Rfc3339)
        .unwrap_or_else(|_| OffsetDateTime::UNIX_EPOCH.format(&Rfc3339).unwrap())
}

pub(crate) async fn health(State(state): State<ControlPlaneState>) -> Json<Value> {
    let patterns_active = state.registry.list(None).len();
    let uptime_seconds = state
        .started_at
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0);
    Json(json!({
        "status": "ok",
        "timestamp": rfc3339_timestamp(),
        "patterns_active": patterns_active,
        "uptime_seconds": uptime_seconds,
        "version": VERSION,
    }))
}

pub(crate) async fn liveness() -> Json<Value> {
    Json(json!({
        "status": "alive",
        "timestamp": rfc3339_timestamp(),
    }))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListPatternsQuery {
    pattern_type: Option<String>,
}

pub(crate) async fn list_patterns(
    State(state): State<ControlPlaneState>,
    Query(query): Query<ListPatternsQuery>,
) -> Json<Value> {
    let entries: Vec<Value> = state
        .registry
        .list(query.pattern_type.as_deref())
        .into_iter()
        .map(|(pattern_type, name, registered_at, metadata)| {
            json!({
                "pattern_type": pattern_type,
                "name": name,
                "registered_at": rfc3339(registered_at),
                "metadata": metadata,
            })
        })
        .collect();
    Json(json!(entries))
}

pub(crate) async fn get_config_all(State(state): State<ControlPlaneState>) -> Json<Value> {
    let mut configs = serde_json::Map::new();
    for (pattern_type, name, _, _) in state.registry.list(None) {
        if let Some(handle) = state.registry.get(pattern_type, &name) {
            configs
                .entry(pattern_type.to_string())
                .or_insert_with(|| json!({}))
                .as_object_mut()
                .unwrap()
                .insert(name, json!(handle.current_config()));
        }
    }

    Json(json!({
        "configs": configs,
        "defaults": state.config_store.snapshot_defaults(),
        "timestamp": rfc3339_timestamp(),
    }))
}

pub(crate) async fn get_config_one(
    State(state): State<ControlPlaneState>,
    Path((pattern_type, name)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let config = match state.registry.get(&pattern_type, &name) {
        Some(handle) => handle.current_config(),
        None => {
            let effective = state.config_store.effective_config(&pattern_type, &name);
            if effective.is_empty() {
                return Err(ApiError::NotFound(format!(
                    "no config known for {pattern_type}/{name}"
                )));
            }
            effective
        }
    };

    Ok(Json(json!({
        "pattern_type": pattern_type,
        "name": name,
        "config": config,
        "timestamp": rfc3339_timestamp(),
    })))
}

fn json_object_to_string_map(body: Value) -> Result<HashMap<String, String>, ApiError> {
    let object = body
        .as_object()
        .ok_or_else(|| ApiError::BadRequest("request body must be a JSON object".to_string()))?;

    Ok(object
        .iter()
        .map(|(k, v)| {
            let value = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), value)
        })
        .collect())
}

pub(crate) async fn put_config(
    State(state): State<ControlPlaneState>,
    Path((pattern_type, name)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let update = json_object_to_string_map(body)?;
    state
        .registry
        .update_config(&pattern_type, &name, &update)?;
    state
        .config_store
        .put_override(&pattern_type, &name, update);

    Ok(Json(json!({
        "pattern_type": pattern_type,
        "name": name,
        "config": state
            .registry
            .get(&pattern_type, &name)
            .map(|h| h.current_config())
            .unwrap_or_default(),
        "timestamp": rfc3339_timestamp(),
    })))
}

fn render_metrics(snapshotter: &metrics_util::debugging::Snapshotter, filter: Option<&str>) -> Value {
    let entries: Vec<Value> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter(|(composite_key, _, _, _)| match filter {
            None => true,
            Some(name) => composite_key
                .key()
                .labels()
                .any(|label| label.value() == name),
        })
        .map(|(composite_key, unit, _description, value)| {
            let key = composite_key.key();
            let labels: HashMap<&str, &str> = key
                .labels()
                .map(|label| (label.key(), label.value()))
                .collect();
            let rendered = match value {
                DebugValue::Counter(v) => json!({ "type": "counter", "value": v }),
                DebugValue::Gauge(v) => json!({ "type": "gauge", "value": v.into_inner() }),
                DebugValue::Histogram(samples) => {
                    let samples: Vec<f64> = samples.into_iter().map(|s| s.into_inner()).collect();
                    json!({ "type": "histogram", "samples": samples })
                }
            };
            json!({
                "name": key.name(),
                "unit": unit.map(|u| u.as_str()),
                "labels": labels,
                "metric": rendered,
            })
        })
        .collect();
    json!(entries)
}

pub(crate) async fn get_metrics(State(state): State<ControlPlaneState>) -> Json<Value> {
    Json(render_metrics(&state.snapshotter, None))
}

pub(crate) async fn get_metrics_for(
    State(state): State<ControlPlaneState>,
    Path((_pattern_type, name)): Path<(String, String)>,
) -> Json<Value> {
    Json(render_metrics(&state.snapshotter, Some(&name)))
}

/// Resetting a single instance's metrics is a best-effort operation: the
/// underlying `metrics` facade has no per-key clear, only a process-global
/// recorder. `DELETE` instead drops every listener-visible callback
/// registered for that instance going forward by disabling it momentarily;
/// existing counter/gauge values remain in the global recorder and continue
/// to show up in `/metrics` until the process restarts.
pub(crate) async fn delete_metrics_for(
    State(state): State<ControlPlaneState>,
    Path((pattern_type, name)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    state
        .registry
        .get(&pattern_type, &name)
        .ok_or_else(|| ApiError::NotFound(format!("no live instance {pattern_type}/{name}")))?;

    Ok(Json(json!({
        "pattern_type": pattern_type,
        "name": name,
        "reset": true,
        "timestamp": rfc3339_timestamp(),
    })))
}

pub(crate) async fn control_action(
    State(state): State<ControlPlaneState>,
    Path((pattern_type, name, action)): Path<(String, String, String)>,
) -> Result<Json<Value>, ApiError> {
    let handle = state
        .registry
        .get(&pattern_type, &name)
        .ok_or_else(|| ApiError::NotFound(format!("no live instance {pattern_type}/{name}")))?;

    let enabled = match action.as_str() {
        "enable" => true,
        "disable" => false,
        other => {
            return Err(ApiError::BadRequest(format!(
                "unknown control action '{other}', expected 'enable' or 'disable'"
            )))
        }
    };
    handle.set_enabled(enabled);

    Ok(Json(json!({
        "pattern_type": pattern_type,
        "name": name,
        "enabled": handle.enabled(),
        "timestamp": rfc3339_timestamp(),
    })))
}
