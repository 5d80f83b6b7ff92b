//! # Broadcast Slot Contract
//!
//! A broadcast slot is a named, shared value with notify-on-write semantics
//! across independent readers. This module defines the contract both store
//! variants implement ([`TransientStore`](crate::TransientStore) and
//! [`DurableStore`](crate::DurableStore)) plus the subscriber registry they
//! share.
//!
//! # Architecture Note
//! Stores are explicit objects injected into whatever needs them, never
//! ambient globals. That keeps every store resettable between test cases: a
//! fresh instance is a fresh world.
//!
//! # Notification Semantics
//! After any `write(key, v)`, every subscriber registered for that exact key
//! is invoked with the new value, synchronously and in write order. The
//! writer's own subscribers are invoked too; there is no self-write
//! suppression, so state propagation has a single code path regardless of who
//! initiated the write.
//!
//! The registry lock is held only while the subscriber list is copied out,
//! never while callbacks run, so a subscriber may re-enter the store. Under
//! the framework's single-threaded cooperative model this preserves write
//! order; if a host introduces real parallelism, writes to the same key must
//! be serialized by the caller to keep that guarantee.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use serde_json::Value;

/// Callback invoked with the new value on every write to the subscribed key.
pub type SlotCallback = Arc<dyn Fn(&Value) + Send + Sync>;

/// The contract shared by the durable and transient store variants.
///
/// A slot is implicitly created on first write and lives as long as its
/// store (transient) or its backing storage (durable). `read` of an absent
/// or malformed slot yields `None`, never an error.
pub trait SlotStore: Send + Sync {
    fn read(&self, key: &str) -> Option<Value>;
    fn write(&self, key: &str, value: Value);
    fn subscribe(&self, key: &str, callback: SlotCallback) -> Subscription;
}

type SubscriberMap = HashMap<String, Vec<(u64, SlotCallback)>>;

/// Per-store subscriber registry, shared by both variants.
#[derive(Default)]
pub(crate) struct SubscriberRegistry {
    subscribers: Arc<Mutex<SubscriberMap>>,
    next_id: AtomicU64,
}

impl SubscriberRegistry {
    pub(crate) fn subscribe(&self, key: &str, callback: SlotCallback) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push((id, callback));
        Subscription {
            id,
            key: key.to_string(),
            subscribers: Arc::downgrade(&self.subscribers),
            active: AtomicBool::new(true),
        }
    }

    /// Fans `value` out to every subscriber of `key`, in registration order.
    pub(crate) fn notify(&self, key: &str, value: &Value) {
        let callbacks: Vec<SlotCallback> = {
            let map = self.subscribers.lock().unwrap();
            match map.get(key) {
                Some(entries) => entries.iter().map(|(_, callback)| callback.clone()).collect(),
                None => return,
            }
        };
        for callback in callbacks {
            callback(value);
        }
    }
}

/// Guard for one registered subscriber.
///
/// `unsubscribe` is idempotent and safe to call during teardown; dropping the
/// guard unsubscribes as well, so a forgotten guard cannot leak a listener.
pub struct Subscription {
    id: u64,
    key: String,
    subscribers: Weak<Mutex<SubscriberMap>>,
    active: AtomicBool,
}

impl Subscription {
    /// Removes the subscriber. Later calls are no-ops.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(subscribers) = self.subscribers.upgrade() {
            let mut map = subscribers.lock().unwrap();
            if let Some(entries) = map.get_mut(&self.key) {
                entries.retain(|(id, _)| *id != self.id);
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
