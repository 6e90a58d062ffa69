//! Events published by the HTTP session transport.

use serde::{Deserialize, Serialize};

/// Events the transport publishes for the session manager to consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TransportEvent {
    /// The credential was rotated by a silent refresh.
    Refreshed,
    /// A request hit an unauthorized response that could not be recovered.
    SessionInvalidated {
        /// HTTP status of the failing response.
        status: u16,
        /// Path of the request that failed.
        path: String,
        /// Session generation current when the failure was observed.
        generation: u64,
    },
}
