//! Current-user session with an optional persisted marker.
//!
//! The marker is the serialized `User` stored under one well-known key in a
//! small key-value store. It is a convenience for restoring the last login,
//! not a contract: write failures are logged and never fail a login, and a
//! corrupt marker is dropped on restore.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::SESSION_KEY;
use crate::models::User;

// ═══════════════════════════════════════════════════════════
// Key-value store
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid session marker: {0}")]
    Format(#[from] serde_json::Error),
    #[error("Invalid store key: {0}")]
    InvalidKey(String),
}

/// String key-value storage for small local values.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, SessionStoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionStoreError>;
    fn remove(&mut self, key: &str) -> Result<(), SessionStoreError>;
}

/// Process-lifetime store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionStoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionStoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SessionStoreError> {
        self.values.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key under `dir`.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, SessionStoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
            && !key.starts_with('.');
        if !valid {
            return Err(SessionStoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionStoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionStoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        // Write-then-rename so a crash never leaves a half-written marker.
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value)?;
        fs::rename(&staging, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SessionStoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// SessionManager
// ═══════════════════════════════════════════════════════════

pub struct SessionManager {
    current: Option<User>,
    store: Box<dyn KeyValueStore>,
}

impl SessionManager {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            current: None,
            store,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    pub fn current(&self) -> Option<&User> {
        self.current.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Replace the current user and cache the marker.
    pub fn login(&mut self, user: User) {
        match serde_json::to_string(&user) {
            Ok(json) => {
                if let Err(e) = self.store.set(SESSION_KEY, &json) {
                    tracing::warn!("Failed to persist session marker: {e}");
                }
            }
            Err(e) => tracing::warn!("Failed to serialize session marker: {e}"),
        }
        tracing::info!(user_id = %user.id, role = %user.role, "Session started");
        self.current = Some(user);
    }

    /// End the session and drop the marker. Returns the previous user.
    pub fn logout(&mut self) -> Option<User> {
        if let Err(e) = self.store.remove(SESSION_KEY) {
            tracing::warn!("Failed to remove session marker: {e}");
        }
        let previous = self.current.take();
        if let Some(user) = &previous {
            tracing::info!(user_id = %user.id, "Session ended");
        }
        previous
    }

    /// Load the cached marker into the session if it parses and `admit`
    /// accepts it. Markers that fail either check are removed.
    pub fn restore<F>(&mut self, admit: F) -> Option<&User>
    where
        F: FnOnce(&User) -> bool,
    {
        let raw = match self.store.get(SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to read session marker: {e}");
                return None;
            }
        };

        match serde_json::from_str::<User>(&raw) {
            Ok(user) if admit(&user) => {
                tracing::info!(user_id = %user.id, "Session restored");
                self.current = Some(user);
                self.current.as_ref()
            }
            Ok(user) => {
                tracing::warn!(
                    user_id = %user.id,
                    role = %user.role,
                    "Discarding rejected session marker"
                );
                self.discard_marker();
                None
            }
            Err(e) => {
                tracing::warn!("Discarding corrupt session marker: {e}");
                self.discard_marker();
                None
            }
        }
    }

    fn discard_marker(&mut self) {
        if let Err(e) = self.store.remove(SESSION_KEY) {
            tracing::warn!("Failed to remove session marker: {e}");
        }
    }
}
