//! UI-level intents expanded into sequences of manager operations.
//!
//! Each step is a separate serialized operation; the first failing step
//! aborts the intent and its error is returned. Steps already completed
//! stay in effect.

use std::fmt;
use std::str::FromStr;

use murmur_common::TransmissionTarget;
use tracing::info;

use crate::error::SessionError;

use super::session::SessionManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Join the aggregate and team channels and listen to both.
    ListenToAll,
    /// Listen to the team channel only.
    ListenToTeam,
    /// Listen to all and transmit into every joined channel.
    TalkToAll,
    /// Transmit into the team channel only.
    TalkToTeam,
    /// Leave every channel.
    MuteSpeaker,
    /// Stop transmitting.
    MuteMicrophone,
}

impl Intent {
    pub const ALL: [Intent; 6] = [
        Intent::ListenToAll,
        Intent::ListenToTeam,
        Intent::TalkToAll,
        Intent::TalkToTeam,
        Intent::MuteSpeaker,
        Intent::MuteMicrophone,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ListenToAll => "listen-all",
            Self::ListenToTeam => "listen-team",
            Self::TalkToAll => "talk-all",
            Self::TalkToTeam => "talk-team",
            Self::MuteSpeaker => "mute-speaker",
            Self::MuteMicrophone => "mute-mic",
        }
    }

    pub async fn apply(self, manager: &SessionManager) -> Result<(), SessionError> {
        match self {
            Self::ListenToAll => manager.listen_to_all().await,
            Self::ListenToTeam => manager.listen_to_team().await,
            Self::TalkToAll => manager.talk_to_all().await,
            Self::TalkToTeam => manager.talk_to_team().await,
            Self::MuteSpeaker => manager.mute_speaker().await,
            Self::MuteMicrophone => manager.mute_microphone().await,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown intent: {0}")]
pub struct ParseIntentError(pub String);

impl FromStr for Intent {
    type Err = ParseIntentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|intent| intent.as_str() == s)
            .ok_or_else(|| ParseIntentError(s.to_string()))
    }
}

impl SessionManager {
    /// Listening to the aggregate channel always includes the team channel.
    pub async fn listen_to_all(&self) -> Result<(), SessionError> {
        info!(intent = %Intent::ListenToAll, "applying intent");
        let all = self.config().all_channel.clone();
        let team = self.config().team_channel.clone();
        self.join_channel(&all).await?;
        self.join_channel(&team).await?;
        self.apply_listen_volume(&all).await?;
        self.apply_listen_volume(&team).await
    }

    /// Join the team channel and drop the aggregate channel.
    pub async fn listen_to_team(&self) -> Result<(), SessionError> {
        info!(intent = %Intent::ListenToTeam, "applying intent");
        let team = self.config().team_channel.clone();
        self.join_channel(&team).await?;
        self.leave_channel(&self.config().all_channel).await?;
        self.apply_listen_volume(&team).await
    }

    /// Talking to all implies listening to all.
    pub async fn talk_to_all(&self) -> Result<(), SessionError> {
        info!(intent = %Intent::TalkToAll, "applying intent");
        self.listen_to_all().await?;
        self.set_transmission(TransmissionTarget::AllJoinedChannels)
            .await
    }

    pub async fn talk_to_team(&self) -> Result<(), SessionError> {
        info!(intent = %Intent::TalkToTeam, "applying intent");
        let team = self.config().team_channel.clone();
        self.join_channel(&team).await?;
        self.set_transmission(TransmissionTarget::single(team)).await
    }

    /// Full disengagement; there is no partial speaker mute.
    pub async fn mute_speaker(&self) -> Result<(), SessionError> {
        info!(intent = %Intent::MuteSpeaker, "applying intent");
        self.leave_all_channels().await
    }

    pub async fn mute_microphone(&self) -> Result<(), SessionError> {
        info!(intent = %Intent::MuteMicrophone, "applying intent");
        self.set_transmission(TransmissionTarget::None).await
    }

    /// Skips the transport call when the channel is already at the
    /// configured listen volume.
    async fn apply_listen_volume(&self, channel: &str) -> Result<(), SessionError> {
        let target = self.config().listen_volume;
        if self.channel_volume(channel).await == Some(target) {
            return Ok(());
        }
        self.set_channel_volume(channel, target.get()).await
    }
}
