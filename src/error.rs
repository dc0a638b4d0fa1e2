//! Error types for the session manager

use crate::api::ApiError;
use crate::store::StoreError;
use crate::token::DecodeError;
use thiserror::Error;

/// Errors surfaced by session manager entry points
#[derive(Error, Debug)]
pub enum SessionError {
    /// A credential could not be structurally decoded
    #[error("malformed credential: {0}")]
    MalformedCredential(#[from] DecodeError),

    /// The server rejected the admin login
    #[error("login rejected ({status}): {detail}")]
    AuthenticationRejected { status: u16, detail: String },

    /// The server rejected the room join
    #[error("room join rejected ({status}): {detail}")]
    RoomJoinRejected { status: u16, detail: String },

    /// The credential store failed
    #[error("credential store error: {0}")]
    Store(#[from] StoreError),

    /// A room service call failed below the HTTP layer
    #[error("room service error: {0}")]
    Api(#[from] ApiError),
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
