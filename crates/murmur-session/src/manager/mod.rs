//! The session manager: login state, channel memberships, listen volumes,
//! transmission target and rosters over an injected transport.

mod intents;
mod operations;
mod pump;
mod session;
mod types;


pub use session::SessionManager;
pub use intents::{Intent, ParseIntentError};
pub use types::{ChannelMembership, SessionConfig};
