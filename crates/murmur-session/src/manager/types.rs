//! Configuration and state types for the session manager.

use std::collections::BTreeMap;

use murmur_common::{SessionId, TransmissionTarget};
use serde::{Deserialize, Serialize};

use crate::volume::ListenVolume;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Manager settings. The binary builds this from the `[session]` and
/// `[channels]` config sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Volume applied by `join_channel` right after joining.
    pub default_volume: ListenVolume,
    /// Capacity of the `SessionEvent` broadcast channel.
    pub event_capacity: usize,
    /// The aggregate channel used by the listen/talk-to-all intents.
    pub all_channel: String,
    /// The team channel used by every intent.
    pub team_channel: String,
    /// Volume the listen intents apply to the channels they join.
    pub listen_volume: ListenVolume,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_volume: ListenVolume::default(),
            event_capacity: 256,
            all_channel: "all".into(),
            team_channel: "team".into(),
            listen_volume: ListenVolume::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// One joined channel. Only exists while joined, so a non-default volume
/// can never be held for a channel that is not joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMembership {
    pub channel: String,
    pub volume: ListenVolume,
    pub joined: bool,
}

impl ChannelMembership {
    pub(crate) fn joined(channel: impl Into<String>, volume: ListenVolume) -> Self {
        Self {
            channel: channel.into(),
            volume,
            joined: true,
        }
    }
}

/// A logged-in (or logging-in) session.
#[derive(Debug, Clone)]
pub(crate) struct ActiveSession {
    pub id: SessionId,
    pub display_name: String,
    pub memberships: BTreeMap<String, ChannelMembership>,
    pub transmission: TransmissionTarget,
}

impl ActiveSession {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            id: SessionId::new(),
            display_name: display_name.into(),
            memberships: BTreeMap::new(),
            transmission: TransmissionTarget::None,
        }
    }

    pub fn is_joined(&self, channel: &str) -> bool {
        self.memberships.contains_key(channel)
    }
}

/// Snapshot read by queries. Only written while the operation lock is held.
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub session: Option<ActiveSession>,
}
