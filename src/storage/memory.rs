use std::collections::HashMap;
use std::sync::RwLock;

use super::KeyValueStore;
use crate::error::StorageError;

/// Volatile store, used by tests and short-lived sessions
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }

    fn set_many(&self, batch: &[(&str, String)]) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        for (key, value) in batch {
            entries.insert(key.to_string(), value.clone());
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let entries = self.entries.read().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::KeyValueStoreExt;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("walletAddress").unwrap(), None);

        store.set("walletAddress", "DAddr").unwrap();
        assert_eq!(store.get("walletAddress").unwrap().as_deref(), Some("DAddr"));

        store.remove("walletAddress").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_json_helpers() {
        let store = MemoryStore::new();
        store.set_json("ids", &vec!["a".to_string(), "b".to_string()]).unwrap();
        let ids: Vec<String> = store.get_json("ids").unwrap().unwrap();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
