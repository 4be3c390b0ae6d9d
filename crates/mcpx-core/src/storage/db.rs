//! SQLite-backed keyed store

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::{migrations, KeyedStore, StorageError};

/// Keyed store persisted in a single `SQLite` table
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a database at the given path
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::Backend(format!("Failed to create {}: {e}", parent.display())))?;
        }
        let conn = Connection::open(path)?;

        // WAL mode for better concurrent read/write performance
        conn.pragma_update(None, "journal_mode", "WAL")?;
        // NORMAL synchronous is safe with WAL and faster than FULL
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "temp_store", "MEMORY")?;

        migrations::run_migrations(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory database (for testing)
    ///
    /// # Errors
    /// Returns an error if the database cannot be created
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Backend("database lock poisoned".to_string()))
    }

    /// All stored keys, sorted
    ///
    /// # Errors
    /// Returns an error if the query fails
    pub fn keys(&self) -> Result<Vec<String>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT key FROM kv_store ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

impl KeyedStore for SqliteStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let conn = self.conn()?;
        conn.execute(
            r"
            INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::KeyedStoreExt;
    use tempfile::TempDir;

    #[test]
    fn test_read_write_remove() {
        let store = SqliteStore::in_memory().unwrap();
        assert_eq!(store.read("a").unwrap(), None);

        store.write("a", "1").unwrap();
        store.write("a", "2").unwrap();
        assert_eq!(store.read("a").unwrap().as_deref(), Some("2"));
        assert_eq!(store.keys().unwrap(), vec!["a".to_string()]);

        assert!(store.remove("a").unwrap());
        assert!(!store.remove("a").unwrap());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("mcpx.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.write_json("collections", &vec!["x"]).unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        let value: Option<Vec<String>> = store.read_json("collections").unwrap();
        assert_eq!(value, Some(vec!["x".to_string()]));
    }
}
