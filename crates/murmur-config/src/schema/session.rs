//! Login and membership defaults.

use serde::{Deserialize, Serialize};

/// Session-level settings applied at login and on every join.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name other participants see.
    pub display_name: String,
    /// Ask the transport to enable text-to-speech.
    pub enable_tts: bool,
    /// Listen volume applied right after a channel is joined (-50..=40).
    pub default_volume: i32,
    /// Buffer size of the session event stream.
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            display_name: "User".into(),
            enable_tts: true,
            default_volume: 0,
            event_capacity: 256,
        }
    }
}
