//! # Durable Store
//!
//! The persisted variant of the broadcast store. Values are serialized to
//! text and handed to an external [`StorageBackend`]; they survive process
//! restarts for as long as the backing storage does.
//!
//! A `write` here replaces the stored value wholesale (no merge), and a
//! `read` deserializes on access, treating absent or malformed text as
//! absence. Writes observed in *other* execution contexts reach this store's
//! subscribers through [`DurableStore::apply_external`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::{debug, warn};

use crate::store::{SlotCallback, SlotStore, SubscriberRegistry, Subscription};

/// External key/value text storage the durable store persists through.
///
/// The backend is an opaque collaborator: anything that can hold text under a
/// string key qualifies. Observation of writes made by other execution
/// contexts is the host's job; bridge such notifications into
/// [`DurableStore::apply_external`].
pub trait StorageBackend: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// In-memory [`StorageBackend`], for tests and demos. Sharing one instance
/// between two `DurableStore`s simulates a restart: the second store reads
/// what the first persisted.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.lock().unwrap().insert(key.to_string(), value.to_string());
    }
}

/// Persistent broadcast store with replace-on-write semantics.
pub struct DurableStore {
    backend: Arc<dyn StorageBackend>,
    subscribers: SubscriberRegistry,
}

impl DurableStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            subscribers: SubscriberRegistry::default(),
        }
    }

    /// Feeds a write observed in another execution context into this store's
    /// subscriber fan-out. The value is not persisted again; the originating
    /// context already did that. Malformed text is ignored with a warning.
    ///
    /// Ordering relative to same-context writes is best-effort: fan-out
    /// happens at the moment the bridge delivers.
    pub fn apply_external(&self, key: &str, text: &str) {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => {
                debug!(key, "External write bridged");
                self.subscribers.notify(key, &value);
            }
            Err(error) => warn!(key, %error, "Ignoring malformed external write"),
        }
    }
}

impl SlotStore for DurableStore {
    fn read(&self, key: &str) -> Option<Value> {
        let text = self.backend.get(key)?;
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(key, %error, "Malformed stored value treated as absent");
                None
            }
        }
    }

    /// Serializes the full value and replaces any prior value outright.
    fn write(&self, key: &str, value: Value) {
        self.backend.set(key, &value.to_string());
        debug!(key, "Durable slot written");
        self.subscribers.notify(key, &value);
    }

    fn subscribe(&self, key: &str, callback: SlotCallback) -> Subscription {
        self.subscribers.subscribe(key, callback)
    }
}
