//! # Fetch Handle
//!
//! The consumer-facing client of a [`FetchController`](crate::FetchController).
//!
//! A handle is cheap to clone; every clone talks to the same controller and
//! observes the same [`ResourceState`]. Dropping the last handle shuts the
//! controller loop down, and any still-in-flight request result is discarded
//! rather than applied.

use tokio::sync::{mpsc, watch};

use crate::error::SyncError;
use crate::message::{ControllerMessage, ObserveSpec};
use crate::state::ResourceState;

/// Client side of a fetch controller.
#[derive(Clone)]
pub struct FetchHandle {
    sender: mpsc::Sender<ControllerMessage>,
    state: watch::Receiver<ResourceState>,
}

impl FetchHandle {
    pub(crate) fn new(
        sender: mpsc::Sender<ControllerMessage>,
        state: watch::Receiver<ResourceState>,
    ) -> Self {
        Self { sender, state }
    }

    /// Declares the observed resource. The controller re-dispatches only when
    /// the spec's trigger key differs from the previous one.
    pub async fn observe(&self, spec: ObserveSpec) -> Result<(), SyncError> {
        self.sender
            .send(ControllerMessage::Observe(spec))
            .await
            .map_err(|_| SyncError::ControllerClosed)
    }

    /// Forces a new dispatch of the current spec even if the payload is
    /// unchanged.
    pub async fn refresh(&self) -> Result<(), SyncError> {
        self.sender
            .send(ControllerMessage::Refresh)
            .await
            .map_err(|_| SyncError::ControllerClosed)
    }

    /// Snapshot of the current resource state.
    pub fn current(&self) -> ResourceState {
        self.state.borrow().clone()
    }

    /// A fresh receiver for consumers that want to `await` state changes
    /// themselves.
    pub fn state(&self) -> watch::Receiver<ResourceState> {
        self.state.clone()
    }

    /// Waits until the current state is settled (`loading == false`) and
    /// returns it. Returns immediately if the state is already settled.
    pub async fn settled(&mut self) -> Result<ResourceState, SyncError> {
        loop {
            let snapshot = self.state.borrow_and_update().clone();
            if snapshot.settled() {
                return Ok(snapshot);
            }
            self.state
                .changed()
                .await
                .map_err(|_| SyncError::ControllerClosed)?;
        }
    }

    /// Waits for at least one state change, then until settled. Use after a
    /// trigger (`observe`/`refresh`) when the previous state was already
    /// settled, to avoid reading it back.
    pub async fn next_settled(&mut self) -> Result<ResourceState, SyncError> {
        loop {
            self.state
                .changed()
                .await
                .map_err(|_| SyncError::ControllerClosed)?;
            let snapshot = self.state.borrow_and_update().clone();
            if snapshot.settled() {
                return Ok(snapshot);
            }
        }
    }
}
