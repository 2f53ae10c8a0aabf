//! Shared request/response types for the control endpoint.
//!
//! Serialized as JSON over the Unix domain socket transport. Both the
//! server (daemon) and the client (CLI) use these types.

use serde::{Deserialize, Serialize};

/// Body of the `set` operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetRequest {
    /// Requested mode: `"on"`, `"off"`, or `"blink"` (case-sensitive).
    pub action: String,
}

/// Result of the `set` operation. `ok` is false for an unrecognized
/// action, in which case the mode was left unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetResponse {
    pub ok: bool,
}

/// Result of the `get` operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetResponse {
    pub action: String,
}

/// Daemon health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub git_hash: String,
    pub build_profile: String,
}

/// Generic error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
