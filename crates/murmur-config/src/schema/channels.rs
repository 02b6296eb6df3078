//! Channel names and volumes used by the listen/talk intents.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelsConfig {
    /// Aggregate channel everyone joins.
    pub all: String,
    /// Team channel; listening to `all` always includes it.
    pub team: String,
    /// Volume applied by the listen intents (-50..=40).
    pub listen_volume: i32,
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            all: "all".into(),
            team: "team".into(),
            listen_volume: 0,
        }
    }
}
