//! # Fleet Sample
//!
//! The data layer of a fleet-tracking dashboard, built on
//! [`sync_framework`]. This crate exposes the core modules for integration
//! testing:
//!
//! - **[model]**: Pure data structures ([`Truck`](model::Truck),
//!   [`TruckQuery`](model::TruckQuery)) shared by feed and consumers.
//! - **[clients]**: The canned [`TruckFeed`](clients::TruckFeed) transport
//!   and the typed [`TruckFeedClient`](clients::TruckFeedClient) wrapper that
//!   hides raw JSON from callers.
//! - **[lifecycle]**: The [`Dashboard`](lifecycle::Dashboard) orchestrator
//!   that wires the controller and both broadcast stores together.
//!
//! Rendering lives elsewhere; everything here is headless.

pub mod clients;
pub mod lifecycle;
pub mod model;
