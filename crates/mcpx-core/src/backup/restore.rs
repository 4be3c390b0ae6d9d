//! Rollback restore

use mcpx_scanner::{FileAccess, ScanError};
use std::path::PathBuf;
use thiserror::Error;

use super::{content_hash, Backup};

/// Errors during restore
#[derive(Error, Debug)]
pub enum RestoreError {
    #[error("Backup not found: {0}")]
    BackupNotFound(String),

    #[error("Hash mismatch for {0}: backup content is corrupt")]
    HashMismatch(String),

    #[error(transparent)]
    Io(#[from] ScanError),
}

impl RestoreError {
    /// Get the error code for CLI/API responses
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::BackupNotFound(_) => "BACKUP_NOT_FOUND",
            Self::HashMismatch(_) => "BACKUP_CORRUPT",
            Self::Io(e) => e.code(),
        }
    }
}

/// Put every file in `backup` back the way it was; returns the paths touched
///
/// Snapshots are checked against their hashes before anything is written.
/// Files the write created are deleted.
///
/// # Errors
/// Returns an error if a snapshot is corrupt or a file operation fails
pub async fn restore_backup(fs: &dyn FileAccess, backup: &Backup) -> Result<Vec<PathBuf>, RestoreError> {
    for file in &backup.files {
        if let (Some(content), Some(hash)) = (&file.original_content, &file.sha256) {
            if content_hash(content) != *hash {
                return Err(RestoreError::HashMismatch(file.path.display().to_string()));
            }
        }
    }

    let mut restored = Vec::with_capacity(backup.files.len());
    for file in backup.files.iter().rev() {
        match &file.original_content {
            Some(content) => fs.write_text(&file.path, content).await?,
            None => fs.remove_file(&file.path).await?,
        }
        restored.push(file.path.clone());
    }
    Ok(restored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::BackupFile;
    use mcpx_scanner::MemoryFs;
    use std::path::Path;

    #[tokio::test]
    async fn test_restore_rewrites_and_deletes() {
        let fs = MemoryFs::new("/h")
            .with_file("/h/a.json", "changed")
            .with_file("/h/b.json", "created");
        let mut backup = Backup::new("cursor");
        backup.add_file(BackupFile::existing(PathBuf::from("/h/a.json"), "original".to_string()));
        backup.add_file(BackupFile::new_file(PathBuf::from("/h/b.json")));

        let restored = restore_backup(&fs, &backup).await.unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(fs.get(Path::new("/h/a.json")).as_deref(), Some("original"));
        assert!(fs.get(Path::new("/h/b.json")).is_none());
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_touches_nothing() {
        let fs = MemoryFs::new("/h").with_file("/h/a.json", "changed");
        let mut file = BackupFile::existing(PathBuf::from("/h/a.json"), "original".to_string());
        file.original_content = Some("tampered".to_string());
        let mut backup = Backup::new("cursor");
        backup.add_file(file);

        let err = restore_backup(&fs, &backup).await.unwrap_err();
        assert_eq!(err.code(), "BACKUP_CORRUPT");
        assert_eq!(fs.get(Path::new("/h/a.json")).as_deref(), Some("changed"));
    }
}
