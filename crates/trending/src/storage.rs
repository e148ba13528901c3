//! Key/value persistence for client-local state.
//!
//! Values are JSON text under fixed keys. Readers fail soft: a missing key,
//! unreadable file or value of the wrong shape all read as "nothing
//! stored".

use crate::error::{Result, StorageError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Raw watchlist add/remove events
pub const EVENTS_KEY: &str = "anime-watchlist-events";
/// Cached trending ranking
pub const TRENDING_CACHE_KEY: &str = "anime-trending-cache";
/// Ids currently on the watchlist
pub const WATCHLIST_KEY: &str = "anime-watchlist";

pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Decode the JSON stored under `key`, `None` when absent or malformed
pub fn read_json<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Option<T> {
    let raw = storage.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            debug!(key, error = %err, "ignoring stored value with unexpected shape");
            None
        }
    }
}

/// Encode and store `value`; failures are logged and swallowed
pub fn write_json<T: Serialize + ?Sized>(storage: &dyn Storage, key: &str, value: &T) {
    let result = serde_json::to_string(value)
        .map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })
        .and_then(|raw| storage.set(key, &raw));
    if let Err(err) = result {
        warn!(key, error = %err, "could not persist value");
    }
}

pub fn remove_key(storage: &dyn Storage, key: &str) {
    if let Err(err) = storage.remove(key) {
        warn!(key, error = %err, "could not remove stored value");
    }
}

// =============================================================================
// In-memory storage
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
        Ok(())
    }
}

// =============================================================================
// File storage
// =============================================================================

/// One `<key>.json` file per key under a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| io_error(&self.dir, e))?;
        let path = self.path_for(key);
        // write-then-rename so a reader never sees half a file
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(|e| io_error(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| io_error(&path, e))
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path, e)),
        }
    }
}
