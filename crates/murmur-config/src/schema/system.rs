//! CLI and logging settings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Upper bound for one command; 0 waits forever.
    pub operation_timeout_secs: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            operation_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber` filter directive.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "murmur=info".into(),
        }
    }
}
