//! Per-channel participant lists.
//!
//! Synchronized independently of the session manager's operation lock so
//! transport callbacks can update it while a join or leave is in flight.

use std::collections::HashMap;

use murmur_common::Participant;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
pub struct Roster {
    channels: RwLock<HashMap<String, Vec<Participant>>>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `participant` into its channel, keeping arrival order. A
    /// participant with the same id is replaced in place. Returns `true`
    /// when the participant was not present before.
    pub async fn add(&self, participant: Participant) -> bool {
        let mut channels = self.channels.write().await;
        let members = channels
            .entry(participant.channel_name.clone())
            .or_default();
        if let Some(existing) = members.iter_mut().find(|p| p.id == participant.id) {
            *existing = participant;
            return false;
        }
        debug!(
            channel = %participant.channel_name,
            participant = %participant.display_name,
            "roster: added"
        );
        members.push(participant);
        true
    }

    /// Remove by id. Returns the removed entry, if any.
    pub async fn remove(&self, participant: &Participant) -> Option<Participant> {
        let mut channels = self.channels.write().await;
        let members = channels.get_mut(&participant.channel_name)?;
        let idx = members.iter().position(|p| p.id == participant.id)?;
        let removed = members.remove(idx);
        if members.is_empty() {
            channels.remove(&participant.channel_name);
        }
        debug!(
            channel = %removed.channel_name,
            participant = %removed.display_name,
            "roster: removed"
        );
        Some(removed)
    }

    /// Replace the flags of a known participant. Unknown participants are
    /// ignored and `false` is returned.
    pub async fn update(&self, participant: Participant) -> bool {
        let mut channels = self.channels.write().await;
        let Some(existing) = channels
            .get_mut(&participant.channel_name)
            .and_then(|members| members.iter_mut().find(|p| p.id == participant.id))
        else {
            return false;
        };
        *existing = participant;
        true
    }

    /// Snapshot of one channel in arrival order.
    pub async fn participants(&self, channel: &str) -> Vec<Participant> {
        self.channels
            .read()
            .await
            .get(channel)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn clear_channel(&self, channel: &str) {
        self.channels.write().await.remove(channel);
    }

    pub async fn clear(&self) {
        self.channels.write().await.clear();
    }
}
