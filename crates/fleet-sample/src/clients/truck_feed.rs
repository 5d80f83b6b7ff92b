//! # Truck Feed
//!
//! [`TruckFeed`] plays the transport's role behind the [`RequestFn`] seam: it
//! answers fleet queries from a canned data set, shaped like the real feed's
//! response envelope (`{ result: { items, total } }` with textual dates).
//!
//! [`TruckFeedClient`] is the consumer-facing wrapper in the same spirit as a
//! resource-specific client over a generic one: it owns the handle plus the
//! schema, and maps the resolved JSON into [`Truck`] records so callers never
//! touch raw values.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use sync_framework::{
    FetchHandle, FetchResponse, FieldType, ObserveSpec, RequestFn, ResourceState, ResponseSchema,
    SyncError,
};
use tokio::sync::watch;
use tracing::debug;

use crate::model::{Truck, TruckQuery, TruckStatus};

/// One raw feed record, dates still textual.
#[derive(Debug, Clone, Serialize)]
struct FeedRecord {
    id: String,
    name: String,
    latitude: f64,
    longitude: f64,
    status: TruckStatus,
    last_seen: String,
}

impl FeedRecord {
    fn matches(&self, query: &TruckQuery) -> bool {
        if let Some(status) = query.status {
            if self.status != status {
                return false;
            }
        }
        if let Some(search) = &query.search {
            if !self.name.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

/// Canned fleet feed implementing the transport seam.
pub struct TruckFeed {
    records: Vec<FeedRecord>,
}

impl TruckFeed {
    /// A small fixed fleet, enough to exercise every filter.
    pub fn with_sample_fleet() -> Self {
        let record = |id: &str, name: &str, lat: f64, lon: f64, status, last_seen: &str| FeedRecord {
            id: id.to_string(),
            name: name.to_string(),
            latitude: lat,
            longitude: lon,
            status,
            last_seen: last_seen.to_string(),
        };
        Self {
            records: vec![
                record("t-1", "Alpine Hauler", 46.95, 7.45, TruckStatus::Moving, "2024-03-01 08:30:00"),
                record("t-2", "Harbor Runner", 53.55, 9.99, TruckStatus::Idle, "2024-03-01 07:45:00"),
                record("t-3", "Canyon Freight", 36.10, -112.10, TruckStatus::Moving, "2024-03-01 08:10:00"),
                record("t-4", "Night Courier", 52.52, 13.40, TruckStatus::Offline, "2024-02-29 23:55:00"),
            ],
        }
    }
}

#[async_trait]
impl RequestFn for TruckFeed {
    async fn call(&self, payload: Value) -> Result<FetchResponse, SyncError> {
        let query: TruckQuery =
            serde_json::from_value(payload).map_err(|error| SyncError::Request(error.to_string()))?;
        let matches: Vec<&FeedRecord> =
            self.records.iter().filter(|record| record.matches(&query)).collect();
        debug!(total = matches.len(), "Feed queried");
        let items = serde_json::to_value(&matches)
            .map_err(|error| SyncError::Request(error.to_string()))?;
        Ok(FetchResponse::new(json!({
            "result": { "items": items, "total": matches.len() }
        })))
    }
}

/// Typed client over the fleet resource controller.
pub struct TruckFeedClient {
    handle: FetchHandle,
    request: Arc<dyn RequestFn>,
}

impl TruckFeedClient {
    pub fn new(handle: FetchHandle, request: Arc<dyn RequestFn>) -> Self {
        Self { handle, request }
    }

    /// The feed's extraction schema: items under `result.items`, total under
    /// `result.total`, `last_seen` normalized to epoch milliseconds.
    fn schema() -> ResponseSchema {
        ResponseSchema::new()
            .data("result.items")
            .total("result.total")
            .field("last_seen", FieldType::Date)
    }

    /// Declares the observed query. Structurally equal queries never
    /// re-dispatch.
    pub async fn query(&self, query: &TruckQuery) -> Result<(), SyncError> {
        let payload =
            serde_json::to_value(query).map_err(|error| SyncError::Payload(error.to_string()))?;
        self.handle
            .observe(ObserveSpec::new(self.request.clone(), payload).schema(Self::schema()))
            .await
    }

    /// Forces a re-fetch of the current query.
    pub async fn refresh(&self) -> Result<(), SyncError> {
        self.handle.refresh().await
    }

    /// Waits until the current state is settled and returns the fleet. Use
    /// for the first load after [`query`](Self::query).
    pub async fn settled_trucks(&mut self) -> Result<Vec<Truck>, SyncError> {
        let state = self.handle.settled().await?;
        Self::decode(state)
    }

    /// Waits for the *next* settlement. Use after a query change or a
    /// [`refresh`](Self::refresh), when the previous state was already
    /// settled and must not be read back.
    pub async fn next_trucks(&mut self) -> Result<Vec<Truck>, SyncError> {
        let state = self.handle.next_settled().await?;
        Self::decode(state)
    }

    /// The feed's reported total for the current query, once settled.
    pub fn total(&self) -> Option<f64> {
        self.handle.current().total
    }

    /// Raw state stream, for consumers that render loading/error themselves.
    pub fn state(&self) -> watch::Receiver<ResourceState> {
        self.handle.state()
    }

    fn decode(state: ResourceState) -> Result<Vec<Truck>, SyncError> {
        if let Some(error) = state.error {
            return Err(error);
        }
        let data = state.data.unwrap_or(Value::Null);
        serde_json::from_value(data).map_err(|error| SyncError::Payload(error.to_string()))
    }
}
