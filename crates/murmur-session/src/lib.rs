//! Multi-channel voice-session manager.
//!
//! [`SessionManager`] owns login state, channel memberships, listen
//! volumes, the transmission target and per-channel rosters. The actual
//! network/media work is delegated to an injected [`VoiceTransport`];
//! [`EchoTransport`] is an in-process loopback implementation.

pub mod error;
pub mod manager;
pub mod retry;
pub mod roster;
pub mod transport;
pub mod volume;

#[cfg(test)]
mod testing;

pub use error::SessionError;
pub use manager::{ChannelMembership, Intent, ParseIntentError, SessionConfig, SessionManager};
pub use retry::{retry, RetryPolicy};
pub use roster::Roster;
pub use transport::{
    ChatCapability, EchoTransport, LoginOptions, TransportError, TransportEvent, VoiceTransport,
};
pub use volume::ListenVolume;
