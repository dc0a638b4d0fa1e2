//! Jukebox session client
//!
//! Client-side session and authorization manager for the Jukebox room
//! service: admins log in with credentials, guests join a room with a short
//! code, and both end up holding a bearer credential scoped to their role.
//! The manager acquires, decodes, persists, recalls and invalidates that
//! credential, and exposes the active session as an observable value.
//!
//! Credentials are decoded without signature verification; the server stays
//! the source of truth and stale sessions are caught by its API rejecting
//! them.
//!
//! # Example
//!
//! ```no_run
//! use jukebox_client::{ApiConfig, FileStore, HttpRoomService, SessionManager};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = HttpRoomService::new(ApiConfig::new("https://jukebox.example"))?;
//!     let store = FileStore::new("session.token");
//!     let manager = SessionManager::new(Arc::new(service), Arc::new(store));
//!
//!     // Re-render whenever the session changes
//!     let _watch = manager.state().subscribe(|session| {
//!         println!("session: {:?}", session);
//!     });
//!
//!     // Restore the persisted session, or join a room fresh
//!     if !manager.try_recall_user().await? {
//!         manager.join_room("ABCDEF".parse()?).await?;
//!     }
//!
//!     Ok(())
//! }
//! ```

mod api;
mod error;
mod room_id;
mod session;
mod state;
mod store;
mod token;

pub use api::{async_trait, ApiConfig, ApiError, HttpRoomService, RoomService, VoteRecord};
pub use error::{Result, SessionError};
pub use room_id::{RoomId, RoomIdError, ROOM_CODE_LEN};
pub use session::SessionManager;
pub use state::{Session, SessionObserver, SessionState, StateSubscription};
pub use store::{CredentialStore, FileStore, MemoryStore, StoreError};
pub use token::{Claims, Credential, DecodeError, Role};
