//! # Resource State
//!
//! The live state of one observed resource, as published by a
//! [`FetchController`](crate::FetchController) and read by any number of
//! consumers through a `watch` channel.
//!
//! # Settlement Invariant
//! After a request settles, exactly one of the following holds:
//! - `loading == true` (a newer trigger is in flight), or
//! - `loading == false` and either `data` or `error` is populated, never both.
//!
//! All transitions go through the controller's single apply path, so the
//! invariant cannot be broken by a consumer.

use serde_json::Value;

use crate::error::SyncError;

/// Per-resource request/response state.
///
/// `payload` is the argument of the in-flight (or last) dispatch, `data` the
/// resolved response body, `total` the optional secondary numeric extracted
/// via the schema's `total_path`, and `error` the last rejection. While a
/// request is in flight `loading` is true and the prior `data`/`error` are
/// retained, so consumers never flash back to an empty view.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState {
    pub payload: Option<Value>,
    pub data: Option<Value>,
    pub total: Option<f64>,
    pub error: Option<SyncError>,
    pub loading: bool,
}

impl ResourceState {
    /// State before the first trigger has been evaluated.
    pub fn initial() -> Self {
        Self {
            payload: None,
            data: None,
            total: None,
            error: None,
            loading: true,
        }
    }

    /// True once the controller has settled the most recent trigger.
    pub fn settled(&self) -> bool {
        !self.loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_loading_and_empty() {
        let state = ResourceState::initial();
        assert!(state.loading);
        assert!(!state.settled());
        assert_eq!(state.data, None);
        assert_eq!(state.error, None);
        assert_eq!(state.total, None);
        assert_eq!(state.payload, None);
    }
}
