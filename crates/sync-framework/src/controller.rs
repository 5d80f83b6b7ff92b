//! # Fetch Controller
//!
//! The request/response state machine for one logical resource.
//!
//! # Architecture Note
//! The controller is the "server" half of the pair created by
//! [`FetchController::new`]. It owns the trigger state (last trigger key,
//! refresh token, dispatch generation) and the sending side of the `watch`
//! channel that consumers read [`ResourceState`] from. Messages from handles
//! are processed sequentially in one loop, so no locks are needed around the
//! state machine.
//!
//! # Stale-Response Suppression
//! Every dispatch captures the controller's generation at dispatch time and
//! runs the request in its own task. When the task reports back, the
//! controller applies the outcome only if the captured generation still
//! equals the current one; a settlement superseded by a newer trigger is
//! discarded without touching visible state. This is the core correctness
//! property of the controller, not an optimization.

use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::handle::FetchHandle;
use crate::message::{ControllerMessage, ObserveSpec, Settlement};
use crate::request;
use crate::schema::{coerce_fields, resolve_path};
use crate::state::ResourceState;

/// Explicit re-evaluation key: a dispatch happens exactly when this key
/// changes. Payloads are compared by canonical JSON serialization, so
/// structurally equal payloads never re-trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TriggerKey {
    request: usize,
    payload: String,
    refresh_token: u64,
    skip: bool,
}

/// The state machine owning one resource's fetch lifecycle.
///
/// Create a controller with [`FetchController::new`], spawn [`run`] as a
/// task, and interact through the returned [`FetchHandle`]. The loop exits
/// when every handle has been dropped; settlements arriving after that are
/// dropped with the channel.
///
/// [`run`]: FetchController::run
pub struct FetchController {
    receiver: mpsc::Receiver<ControllerMessage>,
    settle_tx: mpsc::Sender<Settlement>,
    settle_rx: mpsc::Receiver<Settlement>,
    state: watch::Sender<ResourceState>,
    spec: Option<ObserveSpec>,
    trigger: Option<TriggerKey>,
    generation: u64,
    refresh_token: u64,
}

impl FetchController {
    pub fn new(buffer_size: usize) -> (Self, FetchHandle) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (settle_tx, settle_rx) = mpsc::channel(buffer_size);
        let (state_tx, state_rx) = watch::channel(ResourceState::initial());
        let controller = Self {
            receiver,
            settle_tx,
            settle_rx,
            state: state_tx,
            spec: None,
            trigger: None,
            generation: 0,
            refresh_token: 0,
        };
        (controller, FetchHandle::new(sender, state_rx))
    }

    /// Runs the controller's event loop until every handle is dropped.
    pub async fn run(mut self) {
        info!("Fetch controller started");
        loop {
            tokio::select! {
                command = self.receiver.recv() => match command {
                    Some(ControllerMessage::Observe(spec)) => self.on_observe(spec),
                    Some(ControllerMessage::Refresh) => self.on_refresh(),
                    None => break,
                },
                Some(settlement) = self.settle_rx.recv() => self.on_settled(settlement),
            }
        }
        info!(generation = self.generation, "Fetch controller shut down");
    }

    fn on_observe(&mut self, spec: ObserveSpec) {
        let key = self.trigger_key(&spec);
        if self.trigger.as_ref() == Some(&key) {
            // The schema is not part of the key; keep the latest descriptor
            // so a later refresh (or the in-flight settlement) applies it.
            debug!("Trigger key unchanged, no dispatch");
            self.spec = Some(spec);
            return;
        }
        self.trigger = Some(key);
        self.spec = Some(spec);
        self.dispatch();
    }

    fn on_refresh(&mut self) {
        if self.spec.is_none() {
            debug!("Refresh before first observe, ignoring");
            return;
        }
        self.refresh_token += 1;
        // Fold the new token into the stored key so a subsequent identical
        // observe() is still recognized as unchanged.
        self.trigger = self.spec.as_ref().map(|spec| self.trigger_key(spec));
        self.dispatch();
    }

    fn trigger_key(&self, spec: &ObserveSpec) -> TriggerKey {
        TriggerKey {
            request: request::identity(&spec.request),
            payload: spec.payload.to_string(),
            refresh_token: self.refresh_token,
            skip: spec.skip,
        }
    }

    fn dispatch(&mut self) {
        let Some(spec) = &self.spec else { return };
        // Bumping the generation first invalidates whatever is in flight,
        // including when the new trigger is a skip.
        self.generation += 1;
        let generation = self.generation;

        if spec.skip {
            debug!(generation, "Skip flag set, settling empty");
            self.state.send_modify(|state| {
                state.data = None;
                state.total = None;
                state.error = None;
                state.loading = false;
            });
            return;
        }

        let payload = spec.payload.clone();
        let request = spec.request.clone();
        let settle = self.settle_tx.clone();

        debug!(generation, %payload, "Dispatching request");
        self.state.send_modify(|state| {
            state.loading = true;
            state.payload = Some(payload.clone());
        });

        tokio::spawn(async move {
            let outcome = request.call(payload).await;
            // The controller may already be gone; the result is dropped then.
            let _ = settle.send(Settlement { generation, outcome }).await;
        });
    }

    fn on_settled(&mut self, settlement: Settlement) {
        if settlement.generation != self.generation {
            debug!(
                generation = settlement.generation,
                current = self.generation,
                "Stale result discarded"
            );
            return;
        }
        let schema = self
            .spec
            .as_ref()
            .map(|spec| spec.schema.clone())
            .unwrap_or_default();

        match settlement.outcome {
            Ok(response) => {
                let total = schema.total_path.as_ref().map(|path| {
                    resolve_path(&response.data, path, Value::from(0))
                        .as_f64()
                        .unwrap_or(0.0)
                });
                let mut data = match &schema.data_path {
                    Some(path) => resolve_path(&response.data, path, Value::Null),
                    None => response.data,
                };
                coerce_fields(&mut data, &schema.field_types);
                info!(generation = settlement.generation, "Request settled");
                self.state.send_modify(|state| {
                    state.data = Some(data);
                    state.total = total;
                    state.error = None;
                    state.loading = false;
                });
            }
            Err(error) => {
                warn!(generation = settlement.generation, %error, "Request failed");
                self.state.send_modify(|state| {
                    state.data = None;
                    state.total = None;
                    state.error = Some(error);
                    state.loading = false;
                });
            }
        }
    }
}
