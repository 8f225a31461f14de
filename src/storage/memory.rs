//! In-memory key-value store
//!
//! Backs unit and integration tests; also useful for embedding the session
//! core somewhere that manages its own persistence.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{VaultError, VaultResult};

use super::KeyValueStore;

/// A HashMap-backed store behind a mutex
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.lock().expect("store mutex poisoned").len()
    }

    /// Whether the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> VaultResult<Option<Vec<u8>>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| VaultError::Storage("Store mutex poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> VaultResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| VaultError::StorageWriteFailed("Store mutex poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> VaultResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| VaultError::Storage("Store mutex poisoned".to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.get("a").unwrap().is_none());

        store.set("a", b"one").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some(b"one".as_slice()));
        assert_eq!(store.len(), 1);

        store.set("a", b"two").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some(b"two".as_slice()));

        store.remove("a").unwrap();
        assert!(store.get("a").unwrap().is_none());
        assert!(store.is_empty());

        // Removing an absent key succeeds
        store.remove("a").unwrap();
    }
}
