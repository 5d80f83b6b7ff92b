//! # Mock Requests & Testing Guide
//!
//! Utilities for testing controller consumers without a real transport.
//!
//! Two styles are provided, for two kinds of tests:
//!
//! - [`MockRequest`] — fluent expectation API. Queue up responses, hand the
//!   request to a controller, then [`verify`](MockRequest::verify) that every
//!   expectation was consumed. Best for settle-and-assert tests.
//! - [`manual_request`] — channel-driven. Every `call` surfaces as a
//!   [`PendingCall`] the test resolves whenever (and in whatever order) it
//!   chooses. This is the tool for racing two in-flight requests against each
//!   other, e.g. proving stale-response suppression.
//!
//! ```
//! use serde_json::json;
//! use sync_framework::mock::MockRequest;
//! use sync_framework::RequestFn;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mock = MockRequest::new();
//!     mock.expect_call()
//!         .with_payload(json!({ "id": 42 }))
//!         .return_data(json!({ "name": "truck-42" }));
//!
//!     let request = mock.request();
//!     let response = request.call(json!({ "id": 42 })).await.unwrap();
//!     assert_eq!(response.data, json!({ "name": "truck-42" }));
//!     mock.verify();
//! }
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use crate::error::SyncError;
use crate::request::{FetchResponse, RequestFn};

struct Expectation {
    payload: Option<Value>,
    response: Result<FetchResponse, SyncError>,
}

struct MockRequestInner {
    expectations: Mutex<VecDeque<Expectation>>,
    calls: AtomicU64,
}

#[async_trait]
impl RequestFn for MockRequestInner {
    async fn call(&self, payload: Value) -> Result<FetchResponse, SyncError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let expectation = self.expectations.lock().unwrap().pop_front();
        match expectation {
            Some(expectation) => {
                if let Some(expected) = &expectation.payload {
                    assert_eq!(
                        expected, &payload,
                        "MockRequest: payload mismatch on call"
                    );
                }
                expectation.response
            }
            None => panic!("MockRequest: unexpected call with payload {payload}"),
        }
    }
}

/// A request function with expectation tracking for fluent testing.
///
/// Expectations are consumed in FIFO order; an unexpected call panics, and
/// [`verify`](MockRequest::verify) panics if any expectation is left over.
pub struct MockRequest {
    inner: Arc<MockRequestInner>,
}

impl Default for MockRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRequest {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MockRequestInner {
                expectations: Mutex::new(VecDeque::new()),
                calls: AtomicU64::new(0),
            }),
        }
    }

    /// The request function to hand to a controller. Clones share identity,
    /// exactly like a referentially-stable function in a consumer.
    pub fn request(&self) -> Arc<dyn RequestFn> {
        self.inner.clone()
    }

    /// Expects one call; the builder sets what it returns.
    pub fn expect_call(&self) -> CallExpectationBuilder {
        CallExpectationBuilder {
            payload: None,
            inner: self.inner.clone(),
        }
    }

    /// Number of calls made so far.
    pub fn calls(&self) -> u64 {
        self.inner.calls.load(Ordering::SeqCst)
    }

    /// Panics unless every expectation was consumed.
    pub fn verify(&self) {
        let remaining = self.inner.expectations.lock().unwrap().len();
        if remaining > 0 {
            panic!("MockRequest: {remaining} expectation(s) not met");
        }
    }
}

/// Builder for one expected call.
pub struct CallExpectationBuilder {
    payload: Option<Value>,
    inner: Arc<MockRequestInner>,
}

impl CallExpectationBuilder {
    /// Also asserts the call's payload.
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Resolves the call with a response body.
    pub fn return_data(self, data: Value) {
        self.finish(Ok(FetchResponse::new(data)));
    }

    /// Rejects the call.
    pub fn return_err(self, error: SyncError) {
        self.finish(Err(error));
    }

    fn finish(self, response: Result<FetchResponse, SyncError>) {
        self.inner.expectations.lock().unwrap().push_back(Expectation {
            payload: self.payload,
            response,
        });
    }
}

/// One in-flight call of a [`manual_request`], waiting for the test to
/// resolve it through `respond_to`.
#[derive(Debug)]
pub struct PendingCall {
    pub payload: Value,
    pub respond_to: oneshot::Sender<Result<FetchResponse, SyncError>>,
}

struct ManualRequest {
    sender: mpsc::Sender<PendingCall>,
}

#[async_trait]
impl RequestFn for ManualRequest {
    async fn call(&self, payload: Value) -> Result<FetchResponse, SyncError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(PendingCall { payload, respond_to })
            .await
            .map_err(|_| SyncError::Request("manual request receiver dropped".into()))?;
        response
            .await
            .map_err(|_| SyncError::Request("manual request responder dropped".into()))?
    }
}

/// Creates a request function whose calls block until the test resolves
/// them, plus the receiver the calls arrive on.
///
/// Each `call` registers a [`PendingCall`]; the test inspects the payload and
/// answers through the oneshot responder, in any order. This makes races
/// between superseded and current requests fully deterministic.
pub fn manual_request(buffer_size: usize) -> (Arc<dyn RequestFn>, mpsc::Receiver<PendingCall>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (Arc::new(ManualRequest { sender }), receiver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn mock_request_resolves_expectations_in_order() {
        let mock = MockRequest::new();
        mock.expect_call().return_data(json!(1));
        mock.expect_call().return_err(SyncError::Request("boom".into()));

        let request = mock.request();
        assert_eq!(request.call(json!({})).await.unwrap().data, json!(1));
        assert_eq!(
            request.call(json!({})).await,
            Err(SyncError::Request("boom".into()))
        );
        assert_eq!(mock.calls(), 2);
        mock.verify();
    }

    #[tokio::test]
    async fn manual_request_lets_the_test_resolve_out_of_band() {
        let (request, mut calls) = manual_request(4);

        let in_flight = tokio::spawn({
            let request = request.clone();
            async move { request.call(json!({ "page": 2 })).await }
        });

        let pending = calls.recv().await.expect("call should arrive");
        assert_eq!(pending.payload, json!({ "page": 2 }));
        pending
            .respond_to
            .send(Ok(FetchResponse::new(json!([42]))))
            .unwrap();

        let response = in_flight.await.unwrap().unwrap();
        assert_eq!(response.data, json!([42]));
    }
}
