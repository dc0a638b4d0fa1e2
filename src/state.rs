//! Observable session state
//!
//! Holds the currently active session and pushes every replacement to
//! subscribed observers, so dependents re-render from one shared value
//! instead of polling. There is no buffering: an observer sees the value at
//! subscribe time plus everything set afterwards.

use crate::room_id::RoomId;
use crate::token::{Credential, Role};
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

/// The materialized active identity
///
/// `role` and `room_scope` are cached copies of what decoding `credential`
/// yields, kept alongside it for cheap access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub credential: Credential,
    pub role: Role,
    pub room_scope: Option<RoomId>,
}

/// Observer invoked with the current session on subscribe and on every set
pub type SessionObserver = Arc<dyn Fn(Option<&Session>) + Send + Sync>;

struct StateInner {
    current: Mutex<Option<Session>>,
    observers: Mutex<Vec<(Uuid, SessionObserver)>>,
}

/// An active state subscription that can be unsubscribed
pub struct StateSubscription {
    state: Arc<StateInner>,
    observer_id: Uuid,
}

impl StateSubscription {
    /// Stop receiving session updates
    pub fn unsubscribe(self) {
        self.state
            .observers
            .lock()
            .retain(|(id, _)| *id != self.observer_id);
    }
}

/// Shared observable holding `Session | absent`
///
/// This struct is cheaply cloneable as it uses an internal Arc; all clones
/// view and mutate the same value.
#[derive(Clone)]
pub struct SessionState {
    inner: Arc<StateInner>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StateInner {
                current: Mutex::new(None),
                observers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Get the current session without side effects
    pub fn get(&self) -> Option<Session> {
        self.inner.current.lock().clone()
    }

    /// Replace the current session and synchronously notify all observers
    /// in subscription order
    pub fn set(&self, session: Option<Session>) {
        *self.inner.current.lock() = session.clone();

        // Snapshot the observer list so callbacks can subscribe or
        // unsubscribe without deadlocking
        let observers: Vec<SessionObserver> = self
            .inner
            .observers
            .lock()
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();

        for observer in observers {
            observer(session.as_ref());
        }
    }

    /// Register an observer
    ///
    /// The observer is invoked immediately with the current value and again
    /// on every future `set`. Returns a `StateSubscription` that removes the
    /// observer when unsubscribed.
    pub fn subscribe<F>(&self, observer: F) -> StateSubscription
    where
        F: Fn(Option<&Session>) + Send + Sync + 'static,
    {
        let observer_id = Uuid::new_v4();
        let observer: SessionObserver = Arc::new(observer);

        self.inner
            .observers
            .lock()
            .push((observer_id, observer.clone()));

        let current = self.inner.current.lock().clone();
        observer(current.as_ref());

        StateSubscription {
            state: self.inner.clone(),
            observer_id,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
