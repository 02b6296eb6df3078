//! Caller-side retry policy for joins.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total join attempts; 1 disables retrying.
    pub join_attempts: u32,
    /// Delay between attempts, in milliseconds.
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            join_attempts: 1,
            backoff_ms: 250,
        }
    }
}
