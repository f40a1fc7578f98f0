//! Health check endpoint
//!
//! `GET /` answers `OK` for liveness probes. It touches no state and does not
//! depend on the upstream credential.

/// Health check handler
pub async fn handler() -> &'static str {
    "OK"
}
