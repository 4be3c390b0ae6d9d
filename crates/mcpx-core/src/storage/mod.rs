//! Storage layer (keyed JSON documents)
//!
//! Application state is a handful of JSON documents under fixed keys. The
//! [`KeyedStore`] trait is object-safe over strings; typed access comes from
//! [`KeyedStoreExt`].

pub mod db;
pub mod memory;
pub mod migrations;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

pub use db::SqliteStore;
pub use memory::MemoryStore;

/// Well-known storage keys
pub mod keys {
    pub const COLLECTIONS: &str = "collections";
    pub const TOOL_PROFILES: &str = "tool_profiles";
    pub const ACTIVE_MIGRATION_TASKS: &str = "active_migration_tasks";
    pub const MIGRATION_HISTORY: &str = "migration_history";
    pub const BACKUPS: &str = "backups";
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to (de)serialize '{key}': {message}")]
    Serialize { key: String, message: String },

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    /// Get the error code for CLI/API responses
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Sqlite(_) | Self::Backend(_) => "STORAGE_ERROR",
            Self::Serialize { .. } => "SERIALIZATION_ERROR",
        }
    }
}

/// String key/value persistence
pub trait KeyedStore: Send + Sync {
    /// Read the raw value stored under `key`
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store a raw value under `key`, replacing any previous value
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`; returns whether it existed
    fn remove(&self, key: &str) -> Result<bool, StorageError>;
}

/// Typed JSON access on top of any [`KeyedStore`]
pub trait KeyedStoreExt {
    /// Read and decode a JSON document
    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError>;

    /// Encode and store a JSON document
    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError>;
}

impl<S: KeyedStore + ?Sized> KeyedStoreExt for S {
    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.read(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| StorageError::Serialize {
                    key: key.to_string(),
                    message: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|e| StorageError::Serialize {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.write(key, &raw)
    }
}
