//! In-memory keyed store

use std::collections::HashMap;
use std::sync::Mutex;

use super::{KeyedStore, StorageError};

/// Keyed store backed by a `HashMap`, for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StorageError {
    StorageError::Backend("memory store lock poisoned".to_string())
}

impl KeyedStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.lock().map_err(|_| poisoned())?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .lock()
            .map_err(|_| poisoned())?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.values.lock().map_err(|_| poisoned())?.remove(key).is_some())
    }
}
