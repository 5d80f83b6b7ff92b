//! # Sync Framework
//!
//! Client-side data synchronization for live dashboards: turn an arbitrary
//! asynchronous fetch into stable, race-free state, and keep independent
//! consumers of the same named value synchronized without a central
//! coordinator.
//!
//! ## The Two Halves
//!
//! ### [`FetchController`] — the async resource controller
//!
//! One controller owns the request/response lifecycle of one logical
//! resource. Consumers declare what they want through a cloneable
//! [`FetchHandle`] and read live [`ResourceState`] back; the controller
//! decides when to (re-)issue a request and guarantees that only the
//! most-recently-triggered request's result ever becomes visible.
//!
//! A new dispatch happens exactly when the **trigger key** changes — the key
//! is computed from the request function's identity, the canonical JSON
//! serialization of the payload, a monotonically increasing refresh token,
//! and the skip flag. `refresh()` bumps the token, forcing a re-fetch with an
//! unchanged payload; `skip` settles to the empty state with zero requests.
//!
//! Results of superseded dispatches are discarded by generation: each
//! dispatch captures the controller's generation, and a settlement is applied
//! only while its generation is still current. There is no I/O abortion and
//! no retry; cancellation is purely logical.
//!
//! ### [`SlotStore`] — the broadcast key-value store
//!
//! A broadcast slot is a named value with notify-on-write semantics across
//! independent readers. Two variants share the contract:
//!
//! - [`TransientStore`] lives for the process and **merges** object writes by
//!   shallow field union;
//! - [`DurableStore`] persists through an external [`StorageBackend`] and
//!   **replaces** values wholesale, bridging writes from other execution
//!   contexts via [`DurableStore::apply_external`].
//!
//! Every write notifies every subscriber of that key synchronously, in write
//! order, including the writer's own — one code path for state propagation.
//!
//! ## Quick Start
//!
//! ```
//! use serde_json::json;
//! use sync_framework::{FetchController, MockRequest, ObserveSpec, ResponseSchema};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mock = MockRequest::new();
//!     mock.expect_call()
//!         .with_payload(json!({ "page": 1 }))
//!         .return_data(json!({ "items": [1, 2, 3] }));
//!
//!     let (controller, mut handle) = FetchController::new(8);
//!     tokio::spawn(controller.run());
//!
//!     let spec = ObserveSpec::new(mock.request(), json!({ "page": 1 }))
//!         .schema(ResponseSchema::new().data("items"));
//!     handle.observe(spec).await.unwrap();
//!
//!     let state = handle.settled().await.unwrap();
//!     assert_eq!(state.data, Some(json!([1, 2, 3])));
//!     assert_eq!(state.error, None);
//!     mock.verify();
//! }
//! ```
//!
//! ## Concurrency Model
//!
//! The framework is written for single-threaded cooperative scheduling: every
//! state transition is a synchronous step inside one controller loop, and
//! suspension happens only where a request future is awaited. Everything is
//! nevertheless `Send`, so it runs unchanged on a multi-threaded runtime;
//! the one caveat (serializing same-key store writes under real parallelism)
//! is documented on [`store`].
//!
//! ## Testing
//!
//! See the [`mock`] module: [`MockRequest`] for fluent expectations and
//! [`mock::manual_request`] for deterministic control over in-flight request
//! ordering.

pub mod controller;
pub mod durable;
pub mod error;
pub mod handle;
pub mod message;
pub mod mock;
pub mod request;
pub mod schema;
pub mod state;
pub mod store;
pub mod trace;
pub mod transient;

// Re-export core types for convenience
pub use controller::FetchController;
pub use durable::{DurableStore, MemoryBackend, StorageBackend};
pub use error::SyncError;
pub use handle::FetchHandle;
pub use message::{ControllerMessage, ObserveSpec, Settlement};
pub use mock::MockRequest;
pub use request::{FetchResponse, RequestFn};
pub use schema::{coerce_fields, resolve_path, FieldType, ResponseSchema};
pub use state::ResourceState;
pub use store::{SlotCallback, SlotStore, Subscription};
pub use trace::setup_tracing;
pub use transient::TransientStore;
