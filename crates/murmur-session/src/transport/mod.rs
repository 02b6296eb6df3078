//! The consumed voice transport interface.
//!
//! Every call may suspend for an arbitrary time and may fail. Participant
//! and connection changes arrive on a broadcast stream obtained from
//! [`VoiceTransport::subscribe`].

mod echo;

pub use echo::EchoTransport;

use async_trait::async_trait;
use murmur_common::{Participant, TransmissionMode};
use tokio::sync::broadcast;

/// Options sent with a login request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOptions {
    pub display_name: String,
    pub enable_tts: bool,
}

/// Media requested when joining a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatCapability {
    AudioOnly,
    TextOnly,
    TextAndAudio,
}

/// Asynchronous notifications emitted by a transport.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    LoggedIn,
    LoggedOut,
    ParticipantAdded(Participant),
    ParticipantRemoved(Participant),
    /// Mute or speaking flags changed.
    ParticipantUpdated(Participant),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("transport unavailable")]
    Unavailable,

    #[error("rejected by server: {0}")]
    Rejected(String),

    #[error("transport is not logged in")]
    NotLoggedIn,

    #[error("unknown channel: {0}")]
    UnknownChannel(String),
}

#[async_trait]
pub trait VoiceTransport: Send + Sync {
    async fn login(&self, options: &LoginOptions) -> Result<(), TransportError>;

    async fn logout(&self) -> Result<(), TransportError>;

    async fn join_channel(
        &self,
        channel: &str,
        capability: ChatCapability,
    ) -> Result<(), TransportError>;

    async fn leave_channel(&self, channel: &str) -> Result<(), TransportError>;

    async fn leave_all(&self) -> Result<(), TransportError>;

    async fn set_volume(&self, channel: &str, volume: i32) -> Result<(), TransportError>;

    /// `channel` is only meaningful for [`TransmissionMode::Single`].
    async fn set_transmission(
        &self,
        mode: TransmissionMode,
        channel: Option<&str>,
    ) -> Result<(), TransportError>;

    /// Subscribe to the transport's event stream. Dropping the receiver
    /// unsubscribes.
    fn subscribe(&self) -> broadcast::Receiver<TransportEvent>;
}
