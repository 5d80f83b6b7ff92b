//! # Controller Messages
//!
//! This module defines the message types exchanged between a
//! [`FetchHandle`](crate::FetchHandle) and its
//! [`FetchController`](crate::FetchController), plus the internal settlement
//! record a request task reports back with.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::SyncError;
use crate::request::{FetchResponse, RequestFn};
use crate::schema::ResponseSchema;

/// A resource descriptor declared by a consumer.
///
/// Observing a spec whose trigger key (request identity, serialized payload,
/// refresh token, skip flag) matches the previous one is a no-op; anything
/// else supersedes the in-flight request.
#[derive(Clone)]
pub struct ObserveSpec {
    pub request: Arc<dyn RequestFn>,
    pub payload: Value,
    pub schema: ResponseSchema,
    /// When true, the controller settles to the empty state without issuing
    /// any request.
    pub skip: bool,
}

impl ObserveSpec {
    pub fn new(request: Arc<dyn RequestFn>, payload: Value) -> Self {
        Self {
            request,
            payload,
            schema: ResponseSchema::default(),
            skip: false,
        }
    }

    pub fn schema(mut self, schema: ResponseSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }
}

impl fmt::Debug for ObserveSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserveSpec")
            .field("payload", &self.payload)
            .field("schema", &self.schema)
            .field("skip", &self.skip)
            .finish_non_exhaustive()
    }
}

/// Commands a handle sends to its controller.
#[derive(Debug)]
pub enum ControllerMessage {
    /// Declare (or re-declare) the observed resource.
    Observe(ObserveSpec),
    /// Force a new dispatch even if the payload is unchanged, by bumping the
    /// controller's cache-breaking token.
    Refresh,
}

/// Outcome of one dispatched request, tagged with the generation captured at
/// dispatch time. The controller applies a settlement only if its generation
/// still matches; anything older is discarded.
#[derive(Debug)]
pub struct Settlement {
    pub generation: u64,
    pub outcome: Result<FetchResponse, SyncError>,
}
