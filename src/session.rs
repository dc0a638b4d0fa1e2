//! Session manager
//!
//! The state machine driving session transitions for the room service:
//! connect (admin login), join_room (acquire or reuse a room-scoped
//! credential), try_recall_user (restore a persisted session at startup) and
//! disconnect (invalidate everywhere). It is the only writer of the
//! credential store and the session state; everything else observes.

use crate::api::{ApiError, RoomService};
use crate::error::{Result, SessionError};
use crate::room_id::RoomId;
use crate::state::{Session, SessionState};
use crate::store::CredentialStore;
use crate::token::{Claims, Role};

use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Drives session transitions against the room service.
///
/// This struct is cheaply cloneable as it shares its service, store, state
/// and vote cache through internal Arcs. Operations suspend only at network
/// boundaries; the store and the observable state are always written
/// back-to-back with no await point between them, so observers never see one
/// updated without the other. Overlapping calls are not serialized: the last
/// write wins. No operation retries on its own.
#[derive(Clone)]
pub struct SessionManager {
    service: Arc<dyn RoomService>,
    store: Arc<dyn CredentialStore>,
    state: SessionState,
    voted: Arc<Mutex<HashSet<String>>>,
}

impl SessionManager {
    /// Create a manager over the given room service and credential store
    pub fn new(service: Arc<dyn RoomService>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            service,
            store,
            state: SessionState::new(),
            voted: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// The observable session state, for subscribing dependents
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The currently active session, if any
    pub fn current(&self) -> Option<Session> {
        self.state.get()
    }

    /// Music ids the recalled user has liked, seeded by `try_recall_user`
    pub fn voted_music(&self) -> HashSet<String> {
        self.voted.lock().clone()
    }

    /// Whether the recalled user has liked the given music id
    pub fn has_voted(&self, music_id: &str) -> bool {
        self.voted.lock().contains(music_id)
    }

    /// Log in as admin, replacing whatever session was active.
    ///
    /// Starts with a hard reset (store cleared, state absent), then exchanges
    /// the credentials. On success the returned credential is persisted and
    /// an admin session activates; the role is assumed, not decoded. A
    /// rejected login fails with `AuthenticationRejected` and leaves the
    /// state unauthenticated.
    pub async fn connect(&self, username: &str, password: &str) -> Result<()> {
        self.disconnect();

        let credential = match self.service.login(username, password).await {
            Ok(credential) => credential,
            Err(ApiError::Status { status, body }) => {
                return Err(SessionError::AuthenticationRejected {
                    status,
                    detail: body,
                });
            }
            Err(err) => return Err(err.into()),
        };

        self.store.save(&credential)?;
        self.state.set(Some(Session {
            credential,
            role: Role::Admin,
            room_scope: None,
        }));
        info!("admin session established");
        Ok(())
    }

    /// Join a room, reusing the active session when it already covers it.
    ///
    /// A no-op when the current role is Admin (global scope) or the current
    /// room scope equals the requested room: no store write, no network
    /// call, no notification. Otherwise the old session is discarded, the
    /// room is joined unauthenticated and the role of the new session is
    /// taken from the returned credential's claims.
    pub async fn join_room(&self, room_id: RoomId) -> Result<()> {
        if let Some(session) = self.state.get() {
            if session.role == Role::Admin {
                debug!(room = %room_id, "admin scope covers the room, keeping session");
                return Ok(());
            }
            if session.room_scope.as_ref() == Some(&room_id) {
                debug!(room = %room_id, "already scoped to the room, keeping session");
                return Ok(());
            }
        }

        self.disconnect();

        let credential = match self.service.join(&room_id).await {
            Ok(credential) => credential,
            Err(ApiError::Status { status, body }) => {
                return Err(SessionError::RoomJoinRejected {
                    status,
                    detail: body,
                });
            }
            Err(err) => return Err(err.into()),
        };

        // Role always comes from the decoded claims; a credential that does
        // not decode is never persisted
        let claims = Claims::decode(&credential)?;
        let session = match claims.role {
            Role::Admin => Session {
                credential,
                role: Role::Admin,
                room_scope: None,
            },
            Role::User => Session {
                credential,
                role: Role::User,
                room_scope: Some(room_id.clone()),
            },
        };

        self.store.save(&session.credential)?;
        self.state.set(Some(session));
        info!(room = %room_id, role = ?claims.role, "room session established");
        Ok(())
    }

    /// Restore a session from the persisted credential, best effort.
    ///
    /// Idempotent and safe to call on every start. Returns `Ok(true)` when a
    /// session was activated. Every credential-quality outcome (absent,
    /// corrupt, expired, rejected by the server) comes back as `Ok(false)`
    /// with the store cleared; only store I/O failures surface as errors.
    ///
    /// A decoded Admin credential is trusted locally without a round trip.
    /// A User credential is validated with a liveness check against its room
    /// (rooms expire, which invalidates their user credentials); the
    /// response also seeds the vote cache.
    pub async fn try_recall_user(&self) -> Result<bool> {
        let Some(credential) = self.store.load()? else {
            self.disconnect();
            return Ok(false);
        };

        let claims = match Claims::decode(&credential) {
            Ok(claims) => claims,
            Err(err) => {
                warn!("stored credential is malformed, dropping it: {}", err);
                self.disconnect();
                return Ok(false);
            }
        };

        if claims.is_expired(Utc::now().timestamp()) {
            debug!("stored credential expired, dropping it");
            self.disconnect();
            return Ok(false);
        }

        match claims.role {
            Role::Admin => {
                self.state.set(Some(Session {
                    credential,
                    role: Role::Admin,
                    room_scope: None,
                }));
                info!("admin session recalled");
                Ok(true)
            }
            Role::User => {
                let Some(room_id) = claims.room_id else {
                    warn!("stored user credential has no room scope, dropping it");
                    self.disconnect();
                    return Ok(false);
                };

                match self.service.fetch_voted_music(&credential, &room_id).await {
                    Ok(votes) => {
                        *self.voted.lock() = votes
                            .into_iter()
                            .filter(|vote| vote.like)
                            .map(|vote| vote.music_id)
                            .collect();
                        self.state.set(Some(Session {
                            credential,
                            role: Role::User,
                            room_scope: Some(room_id.clone()),
                        }));
                        info!(room = %room_id, "user session recalled");
                        Ok(true)
                    }
                    Err(err) => {
                        warn!(room = %room_id, "liveness check failed, dropping stored credential: {}", err);
                        self.disconnect();
                        Ok(false)
                    }
                }
            }
        }
    }

    /// Invalidate everywhere: clear the store, empty the vote cache, set the
    /// session state to absent. Never fails; a store clear failure is logged
    /// and ignored.
    pub fn disconnect(&self) {
        if let Err(err) = self.store.clear() {
            warn!("failed to clear stored credential: {}", err);
        }
        self.voted.lock().clear();
        self.state.set(None);
    }
}
