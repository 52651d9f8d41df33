//! Key-Value Persistence
//!
//! The ledger only needs get/set/remove on string values. Multi-key writes
//! go through `set_many`/`remove_many`, which apply all keys or none:
//! - `MemoryStore` for tests and throwaway sessions
//! - `JsonFileStore` keeps every key in one JSON object on disk

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

// ============ Store Trait ============

/// String key-value storage used by the session ledger
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write every pair, or none of them on error
    fn set_many(&self, entries: &[(&str, &str)]) -> StoreResult<()>;

    /// Remove every key, or none of them on error. Missing keys are skipped.
    fn remove_many(&self, keys: &[&str]) -> StoreResult<()>;

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.set_many(&[(key, value)])
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.remove_many(&[key])
    }
}

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

// ============ Memory Store ============

/// In-process store; contents vanish with it
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> StoreResult<()> {
        let mut map = self.entries.write();
        for (key, value) in entries {
            map.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> StoreResult<()> {
        let mut map = self.entries.write();
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

// ============ JSON File Store ============

/// Every key lives in a single JSON object file, rewritten on each change.
pub struct JsonFileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open (or prepare) the store at `path`.
    ///
    /// A missing file is an empty store. So is an unreadable or corrupt one;
    /// it gets overwritten on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                log::warn!("Ignoring corrupt session file {}: {}", path.display(), e);
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                log::warn!("Cannot read session file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    /// Open the store at [`default_store_path`]
    pub fn open_default() -> Self {
        Self::open(default_store_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> StoreResult<()> {
        let mut map = self.entries.write();
        let mut next = map.clone();
        for (key, value) in entries {
            next.insert(key.to_string(), value.to_string());
        }
        // one file write for the whole batch; memory follows disk
        self.flush(&next)?;
        *map = next;
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> StoreResult<()> {
        let mut map = self.entries.write();
        let mut next = map.clone();
        let before = next.len();
        for key in keys {
            next.remove(*key);
        }
        if next.len() != before {
            self.flush(&next)?;
            *map = next;
        }
        Ok(())
    }
}

/// `<data_local_dir>/Tri-Reel/session.json`
pub fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Tri-Reel")
        .join("session.json")
}

// ============ Tests ============
