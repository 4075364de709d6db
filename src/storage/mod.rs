//! Storage and persistence layer
//!
//! - Key-value store trait (`get` / `set` / `remove`)
//! - In-memory and file-backed implementations
//! - Persisted key names

mod file_system;
mod keys;
mod memory;

pub use file_system::FileStore;
pub use keys::*;
pub use memory::MemoryStore;

use crate::error::StorageError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Process-wide key-value store shared by the wallet components.
///
/// Values are strings; structured values are stored as JSON.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Write several keys in one step. Stores that can do this atomically
    /// override it.
    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StorageError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }

    /// Keys currently held, in no particular order
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// JSON helpers available on every store
pub trait KeyValueStoreExt: KeyValueStore {
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value)?;
        self.set(key, &json)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}
