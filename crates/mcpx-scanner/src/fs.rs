//! File access capability
//!
//! The scanner and the target writer never touch the file system directly;
//! they go through [`FileAccess`] so tests can swap in [`MemoryFs`].

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;

use crate::error::{Result, ScanError};

/// Host file system boundary
#[async_trait]
pub trait FileAccess: Send + Sync {
    /// Whether a file exists at `path`
    async fn exists(&self, path: &Path) -> bool;

    /// Read a UTF-8 file
    async fn read_text(&self, path: &Path) -> Result<String>;

    /// Write a file, creating parent directories; the file is either fully
    /// written or left untouched
    async fn write_text(&self, path: &Path, content: &str) -> Result<()>;

    /// Delete a file; a missing file is not an error
    async fn remove_file(&self, path: &Path) -> Result<()>;

    /// The home directory used to expand `~`
    fn home_dir(&self) -> Result<PathBuf>;

    /// Expand a leading `~` to the home directory
    fn resolve_home(&self, path: &str) -> Result<PathBuf> {
        if path == "~" {
            return self.home_dir();
        }
        match path.strip_prefix("~/") {
            Some(rest) => Ok(self.home_dir()?.join(rest)),
            None => Ok(PathBuf::from(path)),
        }
    }
}

/// Real file system backed by `tokio::fs`
#[derive(Debug, Clone, Default)]
pub struct LocalFs {
    home: Option<PathBuf>,
}

impl LocalFs {
    /// Use the current user's home directory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed home directory
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: Some(home.into()),
        }
    }
}

#[async_trait]
impl FileAccess for LocalFs {
    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    async fn read_text(&self, path: &Path) -> Result<String> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ScanError::io(path, &e))
    }

    async fn write_text(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ScanError::io(parent, &e))?;
        }

        // Write to a sibling temp file, then rename over the target
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("config");
        let temp = path.with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4().simple()));

        if let Err(e) = tokio::fs::write(&temp, content).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(ScanError::io(&temp, &e));
        }
        if let Err(e) = tokio::fs::rename(&temp, path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(ScanError::io(path, &e));
        }
        Ok(())
    }

    async fn remove_file(&self, path: &Path) -> Result<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ScanError::io(path, &e)),
        }
    }

    fn home_dir(&self) -> Result<PathBuf> {
        match &self.home {
            Some(home) => Ok(home.clone()),
            None => dirs::home_dir().ok_or(ScanError::HomeNotFound),
        }
    }
}

/// In-memory file system for tests and dry runs
#[derive(Debug)]
pub struct MemoryFs {
    home: PathBuf,
    files: Mutex<HashMap<PathBuf, String>>,
    unreadable: Mutex<HashSet<PathBuf>>,
}

impl MemoryFs {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            files: Mutex::new(HashMap::new()),
            unreadable: Mutex::new(HashSet::new()),
        }
    }

    /// Add a file
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    /// Mark a path as existing but failing on read
    #[must_use]
    pub fn with_unreadable(self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.insert(path.clone(), String::new());
        if let Ok(mut set) = self.unreadable.lock() {
            set.insert(path);
        }
        self
    }

    pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        if let Ok(mut files) = self.files.lock() {
            files.insert(path.into(), content.into());
        }
    }

    /// Current content of a file
    pub fn get(&self, path: &Path) -> Option<String> {
        self.files.lock().ok()?.get(path).cloned()
    }

    /// All stored paths, sorted
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self
            .files
            .lock()
            .map(|f| f.keys().cloned().collect())
            .unwrap_or_default();
        paths.sort();
        paths
    }

    fn is_unreadable(&self, path: &Path) -> bool {
        self.unreadable
            .lock()
            .map(|set| set.contains(path))
            .unwrap_or(false)
    }
}

#[async_trait]
impl FileAccess for MemoryFs {
    async fn exists(&self, path: &Path) -> bool {
        self.files
            .lock()
            .map(|f| f.contains_key(path))
            .unwrap_or(false)
    }

    async fn read_text(&self, path: &Path) -> Result<String> {
        if self.is_unreadable(path) {
            return Err(ScanError::Io {
                path: path.to_path_buf(),
                message: "permission denied".to_string(),
            });
        }
        self.get(path).ok_or_else(|| ScanError::Io {
            path: path.to_path_buf(),
            message: "file not found".to_string(),
        })
    }

    async fn write_text(&self, path: &Path, content: &str) -> Result<()> {
        if self.is_unreadable(path) {
            return Err(ScanError::Io {
                path: path.to_path_buf(),
                message: "permission denied".to_string(),
            });
        }
        self.insert(path, content);
        Ok(())
    }

    async fn remove_file(&self, path: &Path) -> Result<()> {
        if let Ok(mut files) = self.files.lock() {
            files.remove(path);
        }
        Ok(())
    }

    fn home_dir(&self) -> Result<PathBuf> {
        Ok(self.home.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_home() {
        let fs = MemoryFs::new("/home/dev");
        assert_eq!(fs.resolve_home("~/.cursor/mcp.json").unwrap(), PathBuf::from("/home/dev/.cursor/mcp.json"));
        assert_eq!(fs.resolve_home("~").unwrap(), PathBuf::from("/home/dev"));
        assert_eq!(fs.resolve_home("/etc/mcp.json").unwrap(), PathBuf::from("/etc/mcp.json"));
    }

    #[tokio::test]
    async fn test_memory_fs_unreadable() {
        let fs = MemoryFs::new("/home/dev").with_unreadable("/home/dev/a.json");
        assert!(fs.exists(Path::new("/home/dev/a.json")).await);
        assert!(fs.read_text(Path::new("/home/dev/a.json")).await.is_err());
    }

    #[tokio::test]
    async fn test_local_fs_write_creates_parents_and_leaves_no_temp() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFs::with_home(dir.path());
        let target = fs.resolve_home("~/nested/dir/mcp.json").unwrap();

        fs.write_text(&target, "{}").await.unwrap();
        fs.write_text(&target, "{\"a\":1}").await.unwrap();

        assert_eq!(fs.read_text(&target).await.unwrap(), "{\"a\":1}");
        let entries: Vec<_> = std::fs::read_dir(target.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_local_fs_missing_file() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFs::with_home(dir.path());
        let path = dir.path().join("missing.json");
        assert!(!fs.exists(&path).await);
        let err = fs.read_text(&path).await.unwrap_err();
        assert_eq!(err.code(), "IO_ERROR");
    }

    #[tokio::test]
    async fn test_remove_file_tolerates_missing() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFs::with_home(dir.path());
        let path = dir.path().join("mcp.json");
        fs.write_text(&path, "{}").await.unwrap();

        fs.remove_file(&path).await.unwrap();
        assert!(!fs.exists(&path).await);
        fs.remove_file(&path).await.unwrap();
    }
}
