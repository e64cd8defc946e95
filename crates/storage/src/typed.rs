//! Typed, never-throwing layer over the key-value store.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::kv::KeyValueStore;

/// Read and decode a JSON value.
///
/// Missing keys, storage failures, and corrupt payloads all read as
/// `None`; callers must tolerate absent data. There is no schema
/// versioning.
pub fn load<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(raw) => raw?,
        Err(e) => {
            tracing::warn!(key, error = %e, "storage read failed");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "discarding corrupt stored value");
            None
        }
    }
}

/// Encode and write a JSON value, best-effort.
///
/// Failures are logged as warnings and never propagated to the caller.
pub fn save<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) {
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to encode value for storage");
            return;
        }
    };

    if let Err(e) = store.put(key, &raw) {
        tracing::warn!(key, error = %e, "storage write failed");
    }
}
