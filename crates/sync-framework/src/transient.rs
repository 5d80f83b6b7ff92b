//! # Transient Store
//!
//! The process-lifetime variant of the broadcast store: a plain in-memory
//! map, reset whenever the process restarts.
//!
//! Unlike the durable variant, a `write` here merges object values by shallow
//! field union: new fields override, untouched fields persist. Sidebar and
//! map can each write their own slice of a shared slot without clobbering the
//! other's.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;
use tracing::debug;

use crate::store::{SlotCallback, SlotStore, SubscriberRegistry, Subscription};

/// In-memory broadcast store with merge-on-write semantics.
#[derive(Default)]
pub struct TransientStore {
    slots: Mutex<HashMap<String, Value>>,
    subscribers: SubscriberRegistry,
}

impl TransientStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStore for TransientStore {
    fn read(&self, key: &str) -> Option<Value> {
        self.slots.lock().unwrap().get(key).cloned()
    }

    /// Merges `value` into the existing slot by shallow field union when both
    /// are objects; replaces wholesale otherwise. Subscribers receive the
    /// merged value, including the writer's own.
    fn write(&self, key: &str, value: Value) {
        let merged = {
            let mut slots = self.slots.lock().unwrap();
            let merged = match (slots.get(key), value) {
                (Some(Value::Object(existing)), Value::Object(incoming)) => {
                    let mut union = existing.clone();
                    union.extend(incoming);
                    Value::Object(union)
                }
                (_, incoming) => incoming,
            };
            slots.insert(key.to_string(), merged.clone());
            merged
        };
        debug!(key, "Transient slot written");
        self.subscribers.notify(key, &merged);
    }

    fn subscribe(&self, key: &str, callback: SlotCallback) -> Subscription {
        self.subscribers.subscribe(key, callback)
    }
}
