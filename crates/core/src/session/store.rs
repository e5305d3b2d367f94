//! Persisted token storage.
//!
//! The dashboard keeps exactly one piece of client-side state: the raw
//! access token under [`TOKEN_STORAGE_KEY`]. Stores are key/value shaped so
//! a file shared with other client settings keeps those settings intact.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Well-known key the access token is stored under.
pub const TOKEN_STORAGE_KEY: &str = "token";

/// Errors from a [`TokenStore`] backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage file is not a valid JSON object: {0}")]
    Format(#[from] serde_json::Error),
}

/// Backend for the persisted access token.
pub trait TokenStore: Send + Sync {
    /// Read the persisted token, if any.
    fn load(&self) -> Result<Option<String>, StoreError>;

    /// Persist `token`, replacing any previous value.
    fn save(&self, token: &str) -> Result<(), StoreError>;

    /// Remove the persisted token. Removing an absent token is not an error.
    fn clear(&self) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Process-local store. Used by tests and by embedders that persist the
/// token themselves.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `token`, as if persisted by a previous run.
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store
            .entries()
            .insert(TOKEN_STORAGE_KEY.to_string(), token.into());
        store
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.entries().get(TOKEN_STORAGE_KEY).cloned())
    }

    fn save(&self, token: &str) -> Result<(), StoreError> {
        self.entries()
            .insert(TOKEN_STORAGE_KEY.to_string(), token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.entries().remove(TOKEN_STORAGE_KEY);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// Store backed by a JSON object on disk (`{"token": "..."}`).
///
/// A missing file reads as empty. Writes go to a sibling temp file that is
/// renamed over the target, so a crash never leaves a half-written file.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        let _guard = self.guard();
        Ok(self.read_entries()?.remove(TOKEN_STORAGE_KEY))
    }

    fn save(&self, token: &str) -> Result<(), StoreError> {
        let _guard = self.guard();
        let mut entries = self.read_entries()?;
        entries.insert(TOKEN_STORAGE_KEY.to_string(), token.to_string());
        self.write_entries(&entries)
    }

    fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.guard();
        let mut entries = self.read_entries()?;
        if entries.remove(TOKEN_STORAGE_KEY).is_none() {
            return Ok(());
        }
        self.write_entries(&entries)
    }
}
