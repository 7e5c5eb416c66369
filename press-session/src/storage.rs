//! Local key-value storage
//!
//! Plays the role browser local storage plays for the web console: string
//! keys, string values, surviving reloads.

use press_core::{storage_error, PressResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// Persistent string key-value store
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> PressResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> PressResult<()>;

    fn remove(&self, key: &str) -> PressResult<()>;
}

/// In-process store; contents are lost with the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `entries`
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> PressResult<Option<String>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> PressResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> PressResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// JSON file store.
///
/// The file holds one flat object of string values. It is re-read on every
/// access so several processes sharing the file see each other's writes, the
/// way browser tabs share local storage.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    file_lock: RwLock<()>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            file_lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> PressResult<HashMap<String, String>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => {
                return Err(storage_error!(
                    format!("Failed to read {}: {}", self.path.display(), e),
                    "file_store",
                    e
                ))
            }
        };

        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            storage_error!(
                format!("Corrupt storage file {}: {}", self.path.display(), e),
                "file_store",
                e
            )
        })
    }

    fn save(&self, entries: &HashMap<String, String>) -> PressResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                storage_error!(
                    format!("Failed to create {}: {}", parent.display(), e),
                    "file_store",
                    e
                )
            })?;
        }

        let json = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, json).map_err(|e| {
            storage_error!(
                format!("Failed to write {}: {}", self.path.display(), e),
                "file_store",
                e
            )
        })?;

        debug!("Saved local storage to {}", self.path.display());
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> PressResult<Option<String>> {
        let _guard = self.file_lock.read().unwrap_or_else(PoisonError::into_inner);
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> PressResult<()> {
        let _guard = self.file_lock.write().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> PressResult<()> {
        let _guard = self.file_lock.write().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use press_core::PressError;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::with_entries([("current_team", "acme")]);
        assert_eq!(store.get("current_team").unwrap().as_deref(), Some("acme"));

        store.set("current_team", "globex").unwrap();
        assert_eq!(store.get("current_team").unwrap().as_deref(), Some("globex"));

        store.remove("current_team").unwrap();
        assert_eq!(store.get("current_team").unwrap(), None);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("press").join("local_storage.json");

        let store = FileStore::new(&path);
        assert_eq!(store.get("current_team").unwrap(), None);
        store.set("current_team", "acme").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("current_team").unwrap().as_deref(), Some("acme"));

        reopened.remove("current_team").unwrap();
        assert_eq!(store.get("current_team").unwrap(), None);
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local_storage.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(
            store.get("current_team"),
            Err(PressError::Storage { .. })
        ));
    }
}
