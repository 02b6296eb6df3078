//! Listen volume newtype.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Per-channel gain applied to incoming audio, always within
/// `[ListenVolume::MIN, ListenVolume::MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct ListenVolume(i32);

impl ListenVolume {
    pub const MIN: i32 = -50;
    pub const MAX: i32 = 40;
    pub const DEFAULT: i32 = 0;

    /// Strict constructor.
    pub fn new(raw: i32) -> Result<Self, SessionError> {
        if (Self::MIN..=Self::MAX).contains(&raw) {
            Ok(Self(raw))
        } else {
            Err(SessionError::VolumeOutOfRange(raw))
        }
    }

    /// Saturating constructor.
    pub fn clamped(raw: i32) -> Self {
        Self(raw.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

impl Default for ListenVolume {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<i32> for ListenVolume {
    type Error = SessionError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<ListenVolume> for i32 {
    fn from(v: ListenVolume) -> Self {
        v.0
    }
}

impl fmt::Display for ListenVolume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_accepts_bounds() {
        assert_eq!(ListenVolume::new(-50).unwrap().get(), -50);
        assert_eq!(ListenVolume::new(40).unwrap().get(), 40);
        assert_eq!(ListenVolume::new(0).unwrap(), ListenVolume::default());
    }

    #[test]
    fn strict_rejects_out_of_range() {
        assert_eq!(
            ListenVolume::new(41),
            Err(SessionError::VolumeOutOfRange(41))
        );
        assert_eq!(
            ListenVolume::new(-51),
            Err(SessionError::VolumeOutOfRange(-51))
        );
    }

    #[test]
    fn clamped_saturates() {
        assert_eq!(ListenVolume::clamped(1000).get(), 40);
        assert_eq!(ListenVolume::clamped(i32::MIN).get(), -50);
        assert_eq!(ListenVolume::clamped(12).get(), 12);
    }

    #[test]
    fn deserialization_is_strict() {
        let ok: ListenVolume = serde_json::from_str("-10").unwrap();
        assert_eq!(ok.get(), -10);
        assert!(serde_json::from_str::<ListenVolume>("90").is_err());
    }
}
