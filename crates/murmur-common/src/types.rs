use serde::{Deserialize, Serialize};
use std::fmt;

/// Login lifecycle of a voice session. Transitions are strictly sequential:
/// `LoggedOut -> LoggingIn -> LoggedIn -> LoggingOut -> LoggedOut`, with a
/// failed login falling back from `LoggingIn` to `LoggedOut`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoginState {
    #[default]
    LoggedOut,
    LoggingIn,
    LoggedIn,
    LoggingOut,
}

impl fmt::Display for LoginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::LoggedOut => "logged out",
            Self::LoggingIn => "logging in",
            Self::LoggedIn => "logged in",
            Self::LoggingOut => "logging out",
        };
        f.write_str(s)
    }
}

/// Transport-facing transmission mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransmissionMode {
    None,
    All,
    Single,
}

impl fmt::Display for TransmissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "None",
            Self::All => "All",
            Self::Single => "Single",
        };
        f.write_str(s)
    }
}

/// Which channel(s), if any, receive the local microphone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(tag = "kind", content = "channel", rename_all = "snake_case")]
pub enum TransmissionTarget {
    #[default]
    None,
    AllJoinedChannels,
    SingleChannel(String),
}

impl TransmissionTarget {
    pub fn single(channel: impl Into<String>) -> Self {
        Self::SingleChannel(channel.into())
    }

    pub fn mode(&self) -> TransmissionMode {
        match self {
            Self::None => TransmissionMode::None,
            Self::AllJoinedChannels => TransmissionMode::All,
            Self::SingleChannel(_) => TransmissionMode::Single,
        }
    }

    /// The named channel for `SingleChannel`, `None` otherwise.
    pub fn channel(&self) -> Option<&str> {
        match self {
            Self::SingleChannel(name) => Some(name),
            _ => None,
        }
    }

    /// Whether audio is sent into `channel`, assuming it is joined.
    pub fn includes(&self, channel: &str) -> bool {
        match self {
            Self::None => false,
            Self::AllJoinedChannels => true,
            Self::SingleChannel(name) => name == channel,
        }
    }
}

impl fmt::Display for TransmissionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::AllJoinedChannels => f.write_str("all joined channels"),
            Self::SingleChannel(name) => write!(f, "channel {name}"),
        }
    }
}

/// A remote (or local) participant inside one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Stable key assigned by the transport.
    pub id: String,
    pub display_name: String,
    pub channel_name: String,
    pub muted: bool,
    pub speaking: bool,
}

impl Participant {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        channel_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            channel_name: channel_name.into(),
            muted: false,
            speaking: false,
        }
    }
}
