//! Storage for the single bearer credential of this installation.
//!
//! # Design
//! There is at most one credential at a time. Stores take `&self` and guard
//! their state internally so one instance can be shared (`Arc`) between the
//! authenticated client, the login flow and worker threads. Expiry is never
//! tracked here; a 401 from the server is the only expiry signal.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::SessionError;

/// Namespace under which the token is persisted.
pub const NAMESPACE: &str = "auth";
/// Key of the token inside [`NAMESPACE`].
pub const TOKEN_KEY: &str = "jwt";

/// Persists and retrieves the bearer credential.
pub trait SessionStore: Send + Sync {
    fn save(&self, token: &str) -> Result<(), SessionError>;

    /// The current credential, if one is stored.
    fn get(&self) -> Option<String>;

    /// Remove the credential. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), SessionError>;
}

/// Credential kept for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&self, token: &str) -> Result<(), SessionError> {
        let mut slot = self.token.lock().map_err(|_| SessionError::Poisoned)?;
        *slot = Some(token.to_string());
        Ok(())
    }

    fn get(&self) -> Option<String> {
        self.token.lock().ok().and_then(|slot| slot.clone())
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut slot = self.token.lock().map_err(|_| SessionError::Poisoned)?;
        *slot = None;
        Ok(())
    }
}

type Namespaces = BTreeMap<String, BTreeMap<String, String>>;

/// Durable key-value file holding the credential.
///
/// The file contains one JSON object of namespaces, e.g.
/// `{"auth":{"jwt":"..."}}`. `clear` removes the file wholesale.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<Namespaces>, SessionError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, token: &str) -> Result<(), SessionError> {
        let _guard = self.lock.lock().map_err(|_| SessionError::Poisoned)?;
        let mut namespaces = Namespaces::new();
        namespaces
            .entry(NAMESPACE.to_string())
            .or_default()
            .insert(TOKEN_KEY.to_string(), token.to_string());
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec(&namespaces)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn get(&self) -> Option<String> {
        let _guard = self.lock.lock().ok()?;
        match self.read() {
            Ok(namespaces) => namespaces?.get(NAMESPACE)?.get(TOKEN_KEY).cloned(),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "unreadable session file, treating as signed out");
                None
            }
        }
    }

    fn clear(&self) -> Result<(), SessionError> {
        let _guard = self.lock.lock().map_err(|_| SessionError::Poisoned)?;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
