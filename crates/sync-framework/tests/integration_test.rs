use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use sync_framework::mock::{manual_request, MockRequest};
use sync_framework::{
    DurableStore, FetchController, FetchResponse, FieldType, MemoryBackend, ObserveSpec,
    ResponseSchema, SlotStore, SyncError, TransientStore,
};

// --- Async Resource Controller ---

#[tokio::test]
async fn stale_response_is_suppressed() {
    let (request, mut calls) = manual_request(4);
    let (controller, mut handle) = FetchController::new(8);
    tokio::spawn(controller.run());

    handle
        .observe(ObserveSpec::new(request.clone(), json!({ "page": 1 })))
        .await
        .unwrap();
    let first = calls.recv().await.expect("first dispatch");
    assert_eq!(first.payload, json!({ "page": 1 }));

    handle
        .observe(ObserveSpec::new(request, json!({ "page": 2 })))
        .await
        .unwrap();
    let second = calls.recv().await.expect("second dispatch");
    assert_eq!(second.payload, json!({ "page": 2 }));

    // The newer request resolves first and becomes visible.
    second
        .respond_to
        .send(Ok(FetchResponse::new(json!("from page 2"))))
        .unwrap();
    let state = handle.settled().await.unwrap();
    assert_eq!(state.data, Some(json!("from page 2")));

    // The superseded request resolving afterwards must be a no-op.
    first
        .respond_to
        .send(Ok(FetchResponse::new(json!("from page 1"))))
        .unwrap();
    tokio::time::sleep(Duration::from_millis(30)).await;

    let state = handle.current();
    assert_eq!(state.data, Some(json!("from page 2")));
    assert_eq!(state.error, None);
    assert!(!state.loading);
}

#[tokio::test]
async fn refresh_redispatches_with_identical_payload() {
    let (request, mut calls) = manual_request(4);
    let (controller, mut handle) = FetchController::new(8);
    tokio::spawn(controller.run());

    handle
        .observe(ObserveSpec::new(request, json!({ "fleet": "north" })))
        .await
        .unwrap();
    let first = calls.recv().await.expect("first dispatch");
    first
        .respond_to
        .send(Ok(FetchResponse::new(json!(1))))
        .unwrap();
    assert_eq!(handle.settled().await.unwrap().data, Some(json!(1)));

    handle.refresh().await.unwrap();
    let second = calls.recv().await.expect("refresh must force a new dispatch");
    assert_eq!(second.payload, json!({ "fleet": "north" }));
    second
        .respond_to
        .send(Ok(FetchResponse::new(json!(2))))
        .unwrap();
    assert_eq!(handle.next_settled().await.unwrap().data, Some(json!(2)));
}

#[tokio::test]
async fn loading_retains_previous_data_until_settlement() {
    let (request, mut calls) = manual_request(4);
    let (controller, mut handle) = FetchController::new(8);
    tokio::spawn(controller.run());

    handle
        .observe(ObserveSpec::new(request.clone(), json!({ "page": 1 })))
        .await
        .unwrap();
    let first = calls.recv().await.expect("first dispatch");
    first
        .respond_to
        .send(Ok(FetchResponse::new(json!(["truck-1"]))))
        .unwrap();
    handle.settled().await.unwrap();

    let mut states = handle.state();
    states.borrow_and_update();

    handle
        .observe(ObserveSpec::new(request, json!({ "page": 2 })))
        .await
        .unwrap();
    states.changed().await.unwrap();
    let in_flight = states.borrow_and_update().clone();

    // No flash-to-empty: prior data stays while the new payload loads.
    assert!(in_flight.loading);
    assert_eq!(in_flight.data, Some(json!(["truck-1"])));
    assert_eq!(in_flight.payload, Some(json!({ "page": 2 })));

    let second = calls.recv().await.expect("second dispatch");
    second
        .respond_to
        .send(Ok(FetchResponse::new(json!(["truck-2"]))))
        .unwrap();
    assert_eq!(
        handle.settled().await.unwrap().data,
        Some(json!(["truck-2"]))
    );
}

#[tokio::test]
async fn error_state_recovers_on_next_trigger() {
    let mock = MockRequest::new();
    mock.expect_call()
        .return_err(SyncError::Request("timeout".into()));
    mock.expect_call().return_data(json!(["ok"]));
    let (controller, mut handle) = FetchController::new(8);
    tokio::spawn(controller.run());

    let request = mock.request();
    handle
        .observe(ObserveSpec::new(request.clone(), json!({ "try": 1 })))
        .await
        .unwrap();
    let state = handle.settled().await.unwrap();
    assert_eq!(state.error, Some(SyncError::Request("timeout".into())));
    assert_eq!(state.data, None);

    handle
        .observe(ObserveSpec::new(request, json!({ "try": 2 })))
        .await
        .unwrap();
    let state = handle.next_settled().await.unwrap();
    assert_eq!(state.data, Some(json!(["ok"])));
    assert_eq!(state.error, None);
    mock.verify();
}

#[tokio::test]
async fn schema_extraction_and_date_coercion_end_to_end() {
    let mock = MockRequest::new();
    mock.expect_call().return_data(json!({
        "result": {
            "items": [{ "d": "2020-01-01" }],
            "total": 27
        }
    }));
    let (controller, mut handle) = FetchController::new(8);
    tokio::spawn(controller.run());

    let schema = ResponseSchema::new()
        .data("result.items")
        .total("result.total")
        .field("d", FieldType::Date);
    handle
        .observe(ObserveSpec::new(mock.request(), json!({})).schema(schema))
        .await
        .unwrap();

    let state = handle.settled().await.unwrap();
    assert_eq!(state.data, Some(json!([{ "d": 1_577_836_800_000_i64 }])));
    assert_eq!(state.total, Some(27.0));
    assert_eq!(state.error, None);
    assert!(!state.loading);
    mock.verify();
}

// --- Broadcast Key-Value Store ---

fn recording(seen: &Arc<Mutex<Vec<Value>>>) -> sync_framework::SlotCallback {
    let seen = seen.clone();
    Arc::new(move |value: &Value| seen.lock().unwrap().push(value.clone()))
}

#[test]
fn subscribers_observe_writes_in_order() {
    let store = TransientStore::new();

    let early = Arc::new(Mutex::new(Vec::new()));
    let _early_subscription = store.subscribe("k", recording(&early));

    store.write("k", json!({ "v": 1 }));

    let late = Arc::new(Mutex::new(Vec::new()));
    let _late_subscription = store.subscribe("k", recording(&late));

    store.write("k", json!({ "v": 2 }));

    assert_eq!(
        *early.lock().unwrap(),
        vec![json!({ "v": 1 }), json!({ "v": 2 })]
    );
    assert_eq!(*late.lock().unwrap(), vec![json!({ "v": 2 })]);
}

#[test]
fn durable_bridge_synchronizes_two_contexts() {
    // Two stores over one backend stand in for two tabs over one storage
    // area. Each tab bridges the other's writes into its own fan-out.
    let backend = Arc::new(MemoryBackend::new());
    let tab_a = DurableStore::new(backend.clone());
    let tab_b = DurableStore::new(backend);

    let seen_in_b = Arc::new(Mutex::new(Vec::new()));
    let _subscription = tab_b.subscribe("filters", recording(&seen_in_b));

    tab_a.write("filters", json!({ "status": "moving" }));
    // The host's storage-event bridge delivers the serialized write to tab B.
    tab_b.apply_external("filters", r#"{"status":"moving"}"#);

    assert_eq!(*seen_in_b.lock().unwrap(), vec![json!({ "status": "moving" })]);
    // Both tabs read the same persisted value.
    assert_eq!(tab_b.read("filters"), Some(json!({ "status": "moving" })));
}
