//! # Dashboard Lifecycle
//!
//! [`Dashboard`] wires the moving parts together: a spawned
//! [`FetchController`] behind a [`TruckFeedClient`], a [`DurableStore`] for
//! filters that must survive restarts, and a [`TransientStore`] for per-session
//! selection state shared between panes.

use std::sync::Arc;

use sync_framework::{
    DurableStore, FetchController, SlotStore, StorageBackend, SyncError, TransientStore,
};
use tokio::task::JoinHandle;
use tracing::info;

use crate::clients::{TruckFeed, TruckFeedClient};
use crate::model::TruckQuery;

/// Durable slot holding the saved header filters.
pub const FILTERS_SLOT: &str = "dashboard.filters";

/// Transient slot holding the panes' shared selection state.
pub const SELECTION_SLOT: &str = "dashboard.selection";

/// A running dashboard data layer.
pub struct Dashboard {
    pub trucks: TruckFeedClient,
    pub filters: Arc<DurableStore>,
    pub selection: Arc<TransientStore>,
    controller: JoinHandle<()>,
}

impl Dashboard {
    /// Spawns the controller and assembles the stores around the given
    /// backend. The same backend handed to a later `Dashboard` restores the
    /// filters the first one saved.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        let (controller, handle) = FetchController::new(16);
        let controller = tokio::spawn(controller.run());
        let feed = Arc::new(TruckFeed::with_sample_fleet());
        info!("Dashboard data layer started");
        Self {
            trucks: TruckFeedClient::new(handle, feed),
            filters: Arc::new(DurableStore::new(backend)),
            selection: Arc::new(TransientStore::new()),
            controller,
        }
    }

    /// Filters persisted by a previous session, if any parse as a query.
    /// Malformed or absent stored text means "no saved filters".
    pub fn saved_filters(&self) -> Option<TruckQuery> {
        let value = self.filters.read(FILTERS_SLOT)?;
        serde_json::from_value(value).ok()
    }

    /// Persists the given filters for the next session.
    pub fn save_filters(&self, query: &TruckQuery) -> Result<(), SyncError> {
        let value =
            serde_json::to_value(query).map_err(|error| SyncError::Payload(error.to_string()))?;
        self.filters.write(FILTERS_SLOT, value);
        Ok(())
    }

    /// Drops the last controller handle and waits for the loop to exit.
    pub async fn shutdown(self) {
        let Self { trucks, controller, .. } = self;
        drop(trucks);
        let _ = controller.await;
        info!("Dashboard data layer stopped");
    }
}
