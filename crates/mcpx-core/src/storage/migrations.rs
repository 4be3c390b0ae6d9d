//! Database migrations

use rusqlite::Connection;

use super::StorageError;

const CURRENT_VERSION: i32 = 1;

/// Run all pending migrations
///
/// # Errors
/// Returns an error if migrations fail
pub fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    let version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version > CURRENT_VERSION {
        return Err(StorageError::Backend(format!(
            "Database schema version {version} is newer than supported version {CURRENT_VERSION}"
        )));
    }

    if version < 1 {
        migrate_v1(conn)?;
    }

    conn.pragma_update(None, "user_version", CURRENT_VERSION)?;
    Ok(())
}

fn migrate_v1(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        r"
        -- Key/value documents, one JSON blob per key
        CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        ",
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        let version: i32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "user_version", 99).unwrap();
        assert!(run_migrations(&conn).is_err());
    }
}
