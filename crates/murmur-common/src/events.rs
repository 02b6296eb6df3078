use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::{LoginState, Participant, TransmissionTarget};

/// Notifications published by the session manager for UI layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SessionEvent {
    LoginStateChanged(LoginState),
    ChannelJoined { channel: String, volume: i32 },
    ChannelLeft { channel: String },
    VolumeChanged { channel: String, volume: i32 },
    TransmissionChanged(TransmissionTarget),
    ParticipantAdded(Participant),
    ParticipantRemoved(Participant),
    ParticipantUpdated(Participant),
    /// The transport reported a login on its own event stream.
    TransportLoggedIn,
    /// The transport reported a logout (including an unsolicited drop).
    TransportLoggedOut,
    #[serde(other)]
    Unknown,
}

pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Publish to all current subscribers; returns how many received it.
    pub fn publish(&self, event: SessionEvent) -> usize {
        match self.sender.send(event) {
            Ok(delivered) => delivered,
            Err(dropped) => {
                tracing::trace!(event = ?dropped.0, "no subscribers");
                0
            }
        }
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}
