//! # Framework Errors
//!
//! This module defines the common error types used throughout the sync
//! framework. By centralizing error definitions, we ensure consistent error
//! handling across controllers and handles.
//!
//! Note what is deliberately *not* here: a malformed value in the durable
//! store is treated as absence (the read returns `None`), and a stale request
//! result is discarded silently. Neither surfaces as an error.

/// Errors that can occur within the sync framework itself.
///
/// `Request` carries the rejection reason of the transport collaborator
/// verbatim; the framework never retries it. The remaining variants cover
/// channel failures between a [`FetchHandle`](crate::FetchHandle) and its
/// controller task.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("payload serialization failed: {0}")]
    Payload(String),
    #[error("controller closed")]
    ControllerClosed,
}
