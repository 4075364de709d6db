use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use super::KeyValueStore;
use crate::error::StorageError;

const STORE_FILE: &str = "store.json";

/// File-backed store: one JSON document per data directory.
///
/// Every write rewrites the document through a temporary file and a rename,
/// so a crash never leaves a half-written store behind.
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open (or create) the store in the given directory
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(STORE_FILE);

        let entries = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            BTreeMap::new()
        };

        log::debug!("Opened file store at {:?} ({} keys)", path, entries.len());

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Get the path of the backing JSON document
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }

    fn set_many(&self, batch: &[(&str, String)]) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        for (key, value) in batch {
            entries.insert(key.to_string(), value.clone());
        }
        self.persist(&entries)
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let entries = self.entries.read().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();

        {
            let store = FileStore::open(temp_dir.path()).unwrap();
            store
                .set_many(&[
                    ("cachedUtxos", "[]".to_string()),
                    ("lastUtxoRefresh", "1700000000000".to_string()),
                ])
                .unwrap();
            store.set("accepted_terms", "true").unwrap();
            assert!(store.path().exists());
        }

        let reopened = FileStore::open(temp_dir.path()).unwrap();
        assert_eq!(reopened.get("cachedUtxos").unwrap().as_deref(), Some("[]"));
        assert_eq!(reopened.get("accepted_terms").unwrap().as_deref(), Some("true"));
        assert_eq!(reopened.keys().unwrap().len(), 3);

        reopened.remove("accepted_terms").unwrap();
        let again = FileStore::open(temp_dir.path()).unwrap();
        assert_eq!(again.get("accepted_terms").unwrap(), None);
    }
}
