//! Types shared by every murmur crate: session vocabulary, the upward
//! event bus, identifiers and the process-level error enum.

pub mod errors;
pub mod events;
pub mod id;
pub mod types;

pub use errors::{ConfigError, MurmurError};
pub use events::{EventBus, SessionEvent};
pub use id::{new_correlation_id, new_id, SessionId};
pub use types::{LoginState, Participant, TransmissionMode, TransmissionTarget};

pub type Result<T> = std::result::Result<T, MurmurError>;
