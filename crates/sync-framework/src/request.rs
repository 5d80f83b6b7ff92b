//! # Request Trait
//!
//! The transport collaborator behind every controller, reduced to the one
//! seam the framework cares about: a function from payload to future
//! response.
//!
//! # Architecture Note
//! By defining a contract ([`RequestFn`]) that any transport (HTTP client,
//! websocket bridge, canned test data) must satisfy, the controller logic is
//! written *once* and reused for every resource. The framework never inspects
//! transport details beyond the rejection reason and the response's `data`
//! field.
//!
//! # Identity
//! Controllers compare request functions by `Arc` pointer identity, the same
//! way the trigger set treats "the request function reference changed" as a
//! re-fetch cause. Clones of the same `Arc` share one identity; constructing
//! a fresh request object yields a new one.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::SyncError;

/// The response envelope produced by a [`RequestFn`].
///
/// Only `data` is ever read by the framework; everything else the transport
/// returns stays on the transport's side of the seam.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResponse {
    pub data: Value,
}

impl FetchResponse {
    pub fn new(data: Value) -> Self {
        Self { data }
    }
}

/// An asynchronous request function mapping a payload to a future response.
///
/// Implementations must reject (return `Err`) on transport failure; the
/// controller surfaces the rejection verbatim as the resource's `error` and
/// never retries.
#[async_trait]
pub trait RequestFn: Send + Sync + 'static {
    async fn call(&self, payload: Value) -> Result<FetchResponse, SyncError>;
}

/// Stable identity of a request function, used in trigger keys.
pub(crate) fn identity(request: &Arc<dyn RequestFn>) -> usize {
    Arc::as_ptr(request) as *const () as usize
}
