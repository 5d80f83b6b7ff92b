use std::sync::{Arc, Mutex};

use fleet_sample::lifecycle::{Dashboard, SELECTION_SLOT};
use fleet_sample::model::{TruckQuery, TruckStatus};
use serde_json::{json, Value};
use sync_framework::{MemoryBackend, SlotStore};

/// Full end-to-end test over the real controller and canned feed.
#[tokio::test]
async fn dashboard_loads_and_filters_fleet() {
    let mut dashboard = Dashboard::new(Arc::new(MemoryBackend::new()));

    dashboard
        .trucks
        .query(&TruckQuery::default())
        .await
        .expect("Failed to observe query");
    let fleet = dashboard
        .trucks
        .settled_trucks()
        .await
        .expect("Initial load failed");

    assert_eq!(fleet.len(), 4);
    assert_eq!(dashboard.trucks.total(), Some(4.0));
    // The schema turned the feed's textual dates into epoch milliseconds.
    assert!(fleet.iter().all(|truck| truck.last_seen > 1_700_000_000_000));

    let filters = TruckQuery {
        status: Some(TruckStatus::Moving),
        ..TruckQuery::default()
    };
    dashboard
        .trucks
        .query(&filters)
        .await
        .expect("Failed to observe filtered query");
    let moving = dashboard
        .trucks
        .next_trucks()
        .await
        .expect("Filtered load failed");

    assert_eq!(moving.len(), 2);
    assert!(moving.iter().all(|truck| truck.status == TruckStatus::Moving));
    assert_eq!(dashboard.trucks.total(), Some(2.0));

    dashboard.shutdown().await;
}

#[tokio::test]
async fn search_filter_matches_names_case_insensitively() {
    let mut dashboard = Dashboard::new(Arc::new(MemoryBackend::new()));

    let filters = TruckQuery {
        search: Some("harbor".to_string()),
        ..TruckQuery::default()
    };
    dashboard
        .trucks
        .query(&filters)
        .await
        .expect("Failed to observe query");
    let found = dashboard
        .trucks
        .settled_trucks()
        .await
        .expect("Search load failed");

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Harbor Runner");

    dashboard.shutdown().await;
}

/// Filters written to the durable slot come back after a restart, simulated
/// by two dashboards sharing one backend.
#[tokio::test]
async fn filters_persist_across_dashboard_restarts() {
    let backend = Arc::new(MemoryBackend::new());

    let first = Dashboard::new(backend.clone());
    assert_eq!(first.saved_filters(), None);
    let filters = TruckQuery {
        status: Some(TruckStatus::Idle),
        search: Some("runner".to_string()),
    };
    first.save_filters(&filters).expect("Failed to save filters");
    first.shutdown().await;

    let second = Dashboard::new(backend);
    assert_eq!(second.saved_filters(), Some(filters));
    second.shutdown().await;
}

/// Two panes of the same session share selection state through the transient
/// slot; partial writes merge instead of clobbering each other.
#[tokio::test]
async fn selection_slot_merges_between_panes() {
    let dashboard = Dashboard::new(Arc::new(MemoryBackend::new()));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let callback = {
        let seen = seen.clone();
        Arc::new(move |value: &Value| seen.lock().unwrap().push(value.clone()))
    };
    let _detail_pane = dashboard.selection.subscribe(SELECTION_SLOT, callback);

    // The map pane picks a truck, then the detail pane records its zoom.
    dashboard
        .selection
        .write(SELECTION_SLOT, json!({ "truck_id": "t-1" }));
    dashboard
        .selection
        .write(SELECTION_SLOT, json!({ "zoom": 12 }));

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            json!({ "truck_id": "t-1" }),
            json!({ "truck_id": "t-1", "zoom": 12 }),
        ]
    );
    assert_eq!(
        dashboard.selection.read(SELECTION_SLOT),
        Some(json!({ "truck_id": "t-1", "zoom": 12 }))
    );

    dashboard.shutdown().await;
}
