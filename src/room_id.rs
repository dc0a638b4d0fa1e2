//! Room identifiers
//!
//! Rooms are addressed by a six letter uppercase code (e.g. `ABCDEF`), the
//! short form guests type to join. The code is validated once at the parse
//! boundary and treated as an opaque equality key everywhere else.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of a room code in characters
pub const ROOM_CODE_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RoomIdError {
    #[error("room code must be exactly 6 characters")]
    InvalidLength,

    #[error("room code must contain only uppercase ASCII letters")]
    InvalidChar,
}

/// A validated room code
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomId(String);

impl RoomId {
    /// Get the code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RoomId {
    type Err = RoomIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ROOM_CODE_LEN {
            return Err(RoomIdError::InvalidLength);
        }
        if !s.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(RoomIdError::InvalidChar);
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for RoomId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RoomId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
