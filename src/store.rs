//! Secure Locker - File Store
//!
//! Durable `filename → encrypted record` table in SQLite.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::error::{LockerError, LockerResult};
use crate::SCHEMA_VERSION;

/// One stored file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Primary key
    pub filename: String,
    /// Token produced by [`crate::PinCipher::encrypt`]
    #[serde(rename = "encryptedData")]
    pub encrypted_data: String,
    /// MIME type captured at upload
    #[serde(rename = "type")]
    pub mime_type: String,
}

/// SQLite-backed record store
pub struct FileStore {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl FileStore {
    /// Open the database at `db_path`, creating the schema on first run
    pub fn open(db_path: &Path) -> LockerResult<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;
        init_schema(&conn)?;

        log::debug!("Opened file store at {}", db_path.display());

        Ok(Self {
            conn: Mutex::new(conn),
            path: db_path.to_path_buf(),
        })
    }

    /// Database file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert or overwrite by filename
    pub fn put(&self, record: &FileRecord) -> LockerResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO files (filename, encrypted_data, type) VALUES (?1, ?2, ?3)",
            params![record.filename, record.encrypted_data, record.mime_type],
        )?;
        Ok(())
    }

    /// All records, sorted by filename
    pub fn get_all(&self) -> LockerResult<Vec<FileRecord>> {
        let conn = self.conn.lock();

        let mut stmt =
            conn.prepare("SELECT filename, encrypted_data, type FROM files ORDER BY filename")?;
        let rows = stmt.query_map([], row_to_record)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Record for `filename`, if any
    pub fn get(&self, filename: &str) -> LockerResult<Option<FileRecord>> {
        let conn = self.conn.lock();

        let record = conn
            .query_row(
                "SELECT filename, encrypted_data, type FROM files WHERE filename = ?1",
                params![filename],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    /// Delete `filename`, returning whether a record was removed
    ///
    /// Absent names are not an error.
    pub fn delete(&self, filename: &str) -> LockerResult<bool> {
        let conn = self.conn.lock();
        let removed = conn.execute("DELETE FROM files WHERE filename = ?1", params![filename])?;
        Ok(removed > 0)
    }

    /// Number of stored records
    pub fn count(&self) -> LockerResult<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<FileRecord> {
    Ok(FileRecord {
        filename: row.get(0)?,
        encrypted_data: row.get(1)?,
        mime_type: row.get(2)?,
    })
}

/// Columns of the `files` table, in declaration order
const FILES_COLUMNS: [&str; 3] = ["filename", "encrypted_data", "type"];

/// First-run schema creation; newer databases are refused
fn init_schema(conn: &Connection) -> LockerResult<()> {
    let found: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if found == SCHEMA_VERSION {
        return Ok(());
    }
    if found != 0 {
        return Err(LockerError::SchemaVersion {
            expected: SCHEMA_VERSION,
            found,
        });
    }

    // Unversioned file: only adopt a `files` table that already has our shape
    let existing = files_columns(conn)?;
    if !existing.is_empty() && existing != FILES_COLUMNS {
        return Err(LockerError::Database(format!(
            "unversioned database has an incompatible files table: {:?}",
            existing
        )));
    }

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS files (
            filename TEXT PRIMARY KEY,
            encrypted_data TEXT NOT NULL,
            type TEXT NOT NULL
        );
        "#,
    )?;
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

    log::info!("Created locker schema v{}", SCHEMA_VERSION);
    Ok(())
}

/// Column names of an existing `files` table; empty when the table is absent
fn files_columns(conn: &Connection) -> LockerResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('files') ORDER BY cid")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut columns = Vec::new();
    for row in rows {
        columns.push(row?);
    }
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(name: &str, data: &str) -> FileRecord {
        FileRecord {
            filename: name.into(),
            encrypted_data: data.into(),
            mime_type: "text/plain".into(),
        }
    }

    #[test]
    fn test_put_get_delete() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(&dir.path().join("SecureVault.db")).unwrap();

        assert!(store.get("a.txt").unwrap().is_none());

        store.put(&record("a.txt", "AAAA")).unwrap();
        assert_eq!(store.get("a.txt").unwrap(), Some(record("a.txt", "AAAA")));

        assert!(store.delete("a.txt").unwrap());
        assert!(store.get("a.txt").unwrap().is_none());
    }

    #[test]
    fn test_put_is_idempotent_and_overwrites() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(&dir.path().join("SecureVault.db")).unwrap();

        let r = record("a.txt", "AAAA");
        store.put(&r).unwrap();
        store.put(&r).unwrap();
        assert_eq!(store.count().unwrap(), 1);

        store.put(&record("a.txt", "BBBB")).unwrap();
        let all = store.get_all().unwrap();
        assert_eq!(all, vec![record("a.txt", "BBBB")]);
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(&dir.path().join("SecureVault.db")).unwrap();

        assert!(!store.delete("nope").unwrap());

        store.put(&record("a.txt", "AAAA")).unwrap();
        assert!(store.delete("a.txt").unwrap());
        assert!(!store.delete("a.txt").unwrap());
    }

    #[test]
    fn test_get_all_sorted() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(&dir.path().join("SecureVault.db")).unwrap();

        for name in ["c.bin", "a.txt", "b.png"] {
            store.put(&record(name, "x")).unwrap();
        }
        let names: Vec<String> = store.get_all().unwrap().into_iter().map(|r| r.filename).collect();
        assert_eq!(names, vec!["a.txt", "b.png", "c.bin"]);
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("nested").join("SecureVault.db");

        {
            let store = FileStore::open(&db).unwrap();
            store.put(&record("a.txt", "AAAA")).unwrap();
        }

        let store = FileStore::open(&db).unwrap();
        assert_eq!(store.get("a.txt").unwrap(), Some(record("a.txt", "AAAA")));
    }

    #[test]
    fn test_newer_schema_refused() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("SecureVault.db");

        {
            let conn = Connection::open(&db).unwrap();
            conn.pragma_update(None, "user_version", 7).unwrap();
        }

        assert!(matches!(
            FileStore::open(&db),
            Err(LockerError::SchemaVersion { expected: 1, found: 7 })
        ));
    }

    #[test]
    fn test_record_json_uses_type_field() {
        let json = serde_json::to_value(record("a.txt", "AAAA")).unwrap();
        assert_eq!(json["type"], "text/plain");
        assert_eq!(json["encryptedData"], "AAAA");
        assert!(json.get("encrypted_data").is_none());

        let back: FileRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record("a.txt", "AAAA"));
    }

    #[test]
    fn test_foreign_unversioned_table_refused() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("SecureVault.db");

        {
            let conn = Connection::open(&db).unwrap();
            conn.execute_batch("CREATE TABLE files (x INTEGER);").unwrap();
        }

        assert!(matches!(FileStore::open(&db), Err(LockerError::Database(_))));

        // left untouched for whoever owns it
        let conn = Connection::open(&db).unwrap();
        let version: u32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, 0);
    }

    #[test]
    fn test_unversioned_matching_table_adopted() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("SecureVault.db");

        {
            let conn = Connection::open(&db).unwrap();
            conn.execute_batch(
                "CREATE TABLE files (filename TEXT PRIMARY KEY, encrypted_data TEXT NOT NULL, type TEXT NOT NULL);
                 INSERT INTO files VALUES ('a.txt', 'AAAA', 'text/plain');",
            )
            .unwrap();
        }

        let store = FileStore::open(&db).unwrap();
        assert_eq!(store.get("a.txt").unwrap(), Some(record("a.txt", "AAAA")));
    }
}
