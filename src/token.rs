//! Bearer credentials and claims decoding
//!
//! Credentials are opaque three-part tokens whose middle part is unpadded
//! base64url JSON. Decoding is structural only: the signature part is never
//! verified here, the server stays the source of truth and stale credentials
//! are caught by its API rejecting them.

use crate::room_id::RoomId;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("credential is not a three-part token")]
    InvalidFormat,

    #[error("claims payload is not valid base64url: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("claims payload is not a claims object: {0}")]
    Json(#[from] serde_json::Error),
}

/// An opaque bearer credential as issued by the room service.
///
/// The raw token authorizes API calls and is persisted verbatim; it never
/// appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Get the raw token (for the Authorization header and persistence)
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Credential {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential([REDACTED])")
    }
}

/// Role encoded in a credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    User,
}

/// Claims carried inside a credential
///
/// `iat` and `exp` are Unix timestamps in whole seconds, with `iat <= exp`
/// for any credential the server mints. `room_id` is present on User
/// credentials and absent on Admin ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<RoomId>,
    pub iat: i64,
    pub exp: i64,
    pub uuid: Uuid,
}

impl Claims {
    /// Decode the claims embedded in a credential
    ///
    /// Structural decoding only, no signature check.
    pub fn decode(credential: &Credential) -> Result<Self, DecodeError> {
        let parts: Vec<&str> = credential.as_str().split('.').collect();
        if parts.len() != 3 {
            return Err(DecodeError::InvalidFormat);
        }

        let payload = URL_SAFE_NO_PAD.decode(parts[1])?;
        Ok(serde_json::from_slice(&payload)?)
    }

    /// Whether the credential has expired as of `now` (Unix seconds).
    ///
    /// A credential whose `exp` equals the current second is already expired.
    pub fn is_expired(&self, now: i64) -> bool {
        self.exp <= now
    }
}
