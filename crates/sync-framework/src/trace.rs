//! # Observability & Tracing
//!
//! Tracing setup for binaries built on the framework.
//!
//! The framework logs structured events throughout the controller loop and
//! the stores: dispatches and settlements at `debug`, settled requests at
//! `info`, rejected requests and malformed stored values at `warn`. Stale
//! discards are `debug` only; they are an expected outcome, not a fault.
//!
//! ```bash
//! # Compact logs (default)
//! RUST_LOG=info cargo run
//!
//! # Show dispatch/settlement generations and slot writes
//! RUST_LOG=debug cargo run
//! ```

/// Initializes structured logging for the process.
///
/// Call once at startup; levels are controlled through the `RUST_LOG`
/// environment variable.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // keep log lines short; events carry their own fields
        .compact()
        .init();
}
