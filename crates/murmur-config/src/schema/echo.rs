//! In-process echo transport settings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EchoConfig {
    /// Simulated round-trip for every transport call, in milliseconds.
    pub latency_ms: u64,
    /// Participant id reported for the local user. Random when unset.
    pub self_id: Option<String>,
}

impl Default for EchoConfig {
    fn default() -> Self {
        Self {
            latency_ms: 50,
            self_id: None,
        }
    }
}
