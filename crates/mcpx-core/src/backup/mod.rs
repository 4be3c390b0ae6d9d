//! Backup and rollback of target files
//!
//! Every file the target writer touches is recorded first: its original
//! content when it existed, or a marker that it was created. Backups are
//! kept in the [`KeyedStore`] under [`keys::BACKUPS`].

pub mod restore;

use chrono::{DateTime, Utc};
use mcpx_scanner::canonical::generate_id;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::sync::Arc;

use crate::storage::{keys, KeyedStore, KeyedStoreExt, StorageError};

pub use restore::{restore_backup, RestoreError};

/// A set of file snapshots taken before one write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub id: String,
    /// Tool whose files were written
    pub tool_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub files: Vec<BackupFile>,
    pub created_at: DateTime<Utc>,
}

impl Backup {
    pub fn new(tool_id: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            tool_id: tool_id.into(),
            description: None,
            files: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn add_file(&mut self, file: BackupFile) {
        self.files.push(file);
    }
}

/// One file in a backup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupFile {
    /// Resolved absolute path
    pub path: PathBuf,
    /// Original content (None if the file didn't exist)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_content: Option<String>,
    /// SHA256 of the original content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl BackupFile {
    /// Snapshot of a file that exists
    pub fn existing(path: PathBuf, content: String) -> Self {
        Self {
            path,
            sha256: Some(content_hash(&content)),
            original_content: Some(content),
        }
    }

    /// Marker for a file the write creates
    pub fn new_file(path: PathBuf) -> Self {
        Self {
            path,
            original_content: None,
            sha256: None,
        }
    }

    #[must_use]
    pub fn was_new(&self) -> bool {
        self.original_content.is_none()
    }
}

pub(crate) fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Saved backups, oldest first
pub struct BackupLog {
    store: Arc<dyn KeyedStore>,
}

impl BackupLog {
    pub fn new(store: Arc<dyn KeyedStore>) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Result<Vec<Backup>, StorageError> {
        Ok(self.store.read_json(keys::BACKUPS)?.unwrap_or_default())
    }

    pub fn get(&self, id: &str) -> Result<Option<Backup>, StorageError> {
        Ok(self.list()?.into_iter().find(|b| b.id == id))
    }

    pub fn record(&self, backup: &Backup) -> Result<(), StorageError> {
        let mut all = self.list()?;
        all.push(backup.clone());
        self.store.write_json(keys::BACKUPS, &all)
    }

    /// Drop a backup once it has been restored
    pub fn remove(&self, id: &str) -> Result<bool, StorageError> {
        let mut all = self.list()?;
        let before = all.len();
        all.retain(|b| b.id != id);
        if all.len() == before {
            return Ok(false);
        }
        self.store.write_json(keys::BACKUPS, &all)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_backup_file_kinds() {
        let existing = BackupFile::existing(PathBuf::from("/h/mcp.json"), "{}".to_string());
        assert!(!existing.was_new());
        assert_eq!(existing.sha256.as_deref(), Some(content_hash("{}").as_str()));
        assert!(BackupFile::new_file(PathBuf::from("/h/new.json")).was_new());
    }

    #[test]
    fn test_log_record_and_remove() {
        let log = BackupLog::new(Arc::new(MemoryStore::new()));
        let mut backup = Backup::new("cursor").with_description("before migrate");
        backup.add_file(BackupFile::new_file(PathBuf::from("/h/mcp.json")));
        log.record(&backup).unwrap();

        assert_eq!(log.get(&backup.id).unwrap(), Some(backup.clone()));
        assert!(log.remove(&backup.id).unwrap());
        assert!(!log.remove(&backup.id).unwrap());
        assert!(log.list().unwrap().is_empty());
    }
}
