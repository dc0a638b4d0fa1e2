//! Credential persistence
//!
//! A single durable slot holding the current bearer credential, so a session
//! survives process restarts. The raw token is stored exactly as received
//! from the room service, with no re-encoding.

use crate::token::Credential;
use parking_lot::Mutex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Credential store errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("credential store io error: {0}")]
    Io(String),
}

impl StoreError {
    fn io(err: io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Trait for single-slot credential storage
///
/// All operations are synchronous and idempotent under repetition: saving the
/// same credential twice and clearing an empty slot are observable no-ops.
pub trait CredentialStore: Send + Sync {
    /// Read the slot; `None` if never set or cleared
    fn load(&self) -> Result<Option<Credential>, StoreError>;

    /// Overwrite the slot unconditionally
    fn save(&self, credential: &Credential) -> Result<(), StoreError>;

    /// Erase the slot
    fn clear(&self) -> Result<(), StoreError>;
}

/// File-backed credential store
///
/// The slot is one file whose entire contents are the raw credential. A
/// missing file is the absent slot. The parent directory must exist.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileStore {
    fn load(&self) -> Result<Option<Credential>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(Credential::new(raw))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::io(err)),
        }
    }

    fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        fs::write(&self.path, credential.as_str()).map_err(StoreError::io)
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::io(err)),
        }
    }
}

/// In-memory credential store
///
/// Non-persistent slot for tests and embedders that do not want sessions to
/// outlive the process.
#[derive(Default)]
pub struct MemoryStore {
    slot: Mutex<Option<Credential>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self) -> Result<Option<Credential>, StoreError> {
        Ok(self.slot.lock().clone())
    }

    fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        *self.slot.lock() = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot.lock() = None;
        Ok(())
    }
}
