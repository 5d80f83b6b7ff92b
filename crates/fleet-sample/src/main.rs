//! # Fleet Dashboard Demo
//!
//! A headless walk through the dashboard data layer:
//! 1.  Setting up the [`Dashboard`] over an in-memory storage backend.
//! 2.  Loading the full fleet, then a filtered view.
//! 3.  Persisting the filters to the durable slot and sharing a selection
//!     between panes through the transient slot.
//!
//! ## 🧪 Testing
//!
//! See [`sync_framework::mock`] for utilities to test clients without
//! spawning a full controller.

use std::sync::Arc;

use fleet_sample::lifecycle::{Dashboard, FILTERS_SLOT, SELECTION_SLOT};
use fleet_sample::model::{TruckQuery, TruckStatus};
use serde_json::{json, Value};
use sync_framework::{setup_tracing, MemoryBackend, SlotStore, SyncError};
use tracing::{info, Instrument};

#[tokio::main]
async fn main() -> Result<(), SyncError> {
    // Setup tracing once for the entire application
    setup_tracing();

    info!("Starting fleet dashboard data layer");

    let backend = Arc::new(MemoryBackend::new());
    let mut dashboard = Dashboard::new(backend);

    // Any pane can watch the shared selection slot.
    let _selection_watch = dashboard.selection.subscribe(
        SELECTION_SLOT,
        Arc::new(|value: &Value| info!(selection = %value, "Selection changed")),
    );

    let span = tracing::info_span!("initial_load");
    let fleet = async {
        info!("Loading the full fleet");
        dashboard.trucks.query(&TruckQuery::default()).await?;
        dashboard.trucks.settled_trucks().await
    }
    .instrument(span)
    .await?;

    info!(
        trucks = fleet.len(),
        total = ?dashboard.trucks.total(),
        "Fleet loaded"
    );

    // Narrow to trucks on the move and remember the choice for next session.
    let filters = TruckQuery {
        status: Some(TruckStatus::Moving),
        ..TruckQuery::default()
    };
    dashboard.save_filters(&filters)?;
    info!(slot = FILTERS_SLOT, "Filters persisted");

    let span = tracing::info_span!("filtered_load");
    let moving = async {
        info!("Loading the filtered fleet");
        dashboard.trucks.query(&filters).await?;
        dashboard.trucks.next_trucks().await
    }
    .instrument(span)
    .await?;

    info!(trucks = moving.len(), "Moving trucks loaded");

    // The map pane picks a truck; the detail pane adds its zoom preference.
    // Both land in the same slot via shallow merge.
    if let Some(truck) = moving.first() {
        dashboard
            .selection
            .write(SELECTION_SLOT, json!({ "truck_id": truck.id }));
        dashboard
            .selection
            .write(SELECTION_SLOT, json!({ "zoom": 12 }));
    }

    // A manual refresh re-fetches the unchanged query.
    dashboard.trucks.refresh().await?;
    let refreshed = dashboard.trucks.next_trucks().await?;
    info!(trucks = refreshed.len(), "Refreshed");

    dashboard.shutdown().await;

    info!("Application completed successfully");
    Ok(())
}
