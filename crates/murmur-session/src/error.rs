use murmur_common::MurmurError;

use crate::transport::TransportError;

/// Structured outcome of a failed session operation. A failed operation
/// leaves the manager exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("another login or logout is already in progress")]
    AlreadyInProgress,

    #[error("already logged in")]
    AlreadyLoggedIn,

    #[error("not logged in")]
    NotLoggedIn,

    #[error("login failed: {0}")]
    LoginFailed(TransportError),

    #[error("logout failed: {0}")]
    LogoutFailed(TransportError),

    #[error("failed to join {0}: {1}")]
    JoinFailed(String, TransportError),

    #[error("failed to leave {0}: {1}")]
    LeaveFailed(String, TransportError),

    #[error("channel {0} is not joined")]
    NotJoined(String),

    #[error("cannot transmit to {0}: channel is not joined")]
    ChannelNotJoined(String),

    #[error("volume {0} is outside [-50, 40]")]
    VolumeOutOfRange(i32),

    #[error("failed to set volume on {0}: {1}")]
    VolumeFailed(String, TransportError),

    #[error("failed to set transmission: {0}")]
    TransmissionFailed(TransportError),

    #[error("voice transport is unavailable")]
    TransportUnavailable,

    #[error("operation aborted before completing")]
    Aborted,
}

impl SessionError {
    /// Failures worth retrying from the caller side.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransportUnavailable)
    }

    /// Map a transport failure into the operation-specific variant.
    /// `Unavailable` always becomes [`SessionError::TransportUnavailable`].
    pub(crate) fn from_transport(
        err: TransportError,
        wrap: impl FnOnce(TransportError) -> SessionError,
    ) -> Self {
        match err {
            TransportError::Unavailable => Self::TransportUnavailable,
            other => wrap(other),
        }
    }
}

impl From<SessionError> for MurmurError {
    fn from(err: SessionError) -> Self {
        MurmurError::Session(err.to_string())
    }
}
