//! SQLite case database handle
//!
//! One connection per case file, guarded by a mutex so the handle can sit
//! behind the `Send + Sync` store traits. `close` drops the connection; any
//! later call fails with `StoreError::Closed`.

use crate::adapters::database::traits::KeyValueTable;
use crate::domain::builtin::{BUILTIN_ARTIFACT_TYPES, BUILTIN_ATTRIBUTE_TYPES};
use crate::domain::{PortableCaseError, Result, StoreError};
use rusqlite::{params, Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

const CASE_NAME_KEY: &str = "case_name";

/// A case database on disk
pub struct SqliteCaseDb {
    conn: Mutex<Option<Connection>>,
    /// Directory holding the database; relative file paths resolve against it
    root: PathBuf,
}

impl SqliteCaseDb {
    /// Opens an existing case database read-only
    ///
    /// The file is never written and its journal mode is left as found.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::OpenFailed` if the file is missing or has no case
    /// schema.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(StoreError::OpenFailed(format!(
                "{} does not exist or is not a file",
                path.display()
            ))
            .into());
        }

        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| open_failed(path, e))?;
        configure_session_pragmas(&conn).map_err(|e| open_failed(path, e))?;

        let has_schema: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'tsk_objects')",
                [],
                |row| row.get(0),
            )
            .map_err(|e| open_failed(path, e))?;
        if !has_schema {
            return Err(StoreError::OpenFailed(format!(
                "{} is not a case database",
                path.display()
            ))
            .into());
        }

        debug!(path = %path.display(), "Opened case database");
        Ok(Self::from_connection(conn, path))
    }

    /// Creates a new case database with the built-in types seeded
    ///
    /// # Errors
    ///
    /// Returns `StoreError::OpenFailed` if the file already exists and
    /// `StoreError::SchemaFailed` if the schema cannot be created.
    pub fn create(path: &Path, case_name: &str) -> Result<Self> {
        if path.exists() {
            return Err(StoreError::OpenFailed(format!(
                "{} already exists",
                path.display()
            ))
            .into());
        }

        let conn = Connection::open(path).map_err(|e| open_failed(path, e))?;
        configure_journal(&conn).map_err(|e| open_failed(path, e))?;
        configure_session_pragmas(&conn).map_err(|e| open_failed(path, e))?;
        initialize_schema(&conn, case_name)
            .map_err(|e| StoreError::SchemaFailed(e.to_string()))?;

        debug!(path = %path.display(), case_name, "Created case database");
        Ok(Self::from_connection(conn, path))
    }

    fn from_connection(conn: Connection, path: &Path) -> Self {
        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            conn: Mutex::new(Some(conn)),
            root,
        }
    }

    /// Directory holding the database file
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Registers an examiner login and returns its id
    pub fn add_examiner(&self, login_name: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tsk_examiners (login_name) VALUES (?1)",
                params![login_name],
            )
            .map_err(insert_failed)?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub(crate) fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let guard = self
            .conn
            .lock()
            .map_err(|_| StoreError::QueryFailed("connection lock poisoned".to_string()))?;
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        f(conn)
    }

    pub(crate) fn read_case_name(&self) -> Result<String> {
        self.with_conn(|conn| {
            match conn.query_row(
                "SELECT value FROM tsk_db_info WHERE name = ?1",
                params![CASE_NAME_KEY],
                |row| row.get(0),
            ) {
                Ok(name) => Ok(name),
                Err(rusqlite::Error::QueryReturnedNoRows) => {
                    Err(StoreError::NotFound("case name".to_string()).into())
                }
                Err(e) => Err(query_failed(e)),
            }
        })
    }

    pub(crate) fn begin(&self) -> Result<()> {
        self.with_conn(|conn| {
            if !conn.is_autocommit() {
                return Err(StoreError::TransactionFailed(
                    "a transaction is already open".to_string(),
                )
                .into());
            }
            conn.execute_batch("BEGIN IMMEDIATE")
                .map_err(|e| StoreError::TransactionFailed(e.to_string()).into())
        })
    }

    pub(crate) fn commit(&self) -> Result<()> {
        self.with_conn(|conn| {
            if conn.is_autocommit() {
                return Err(
                    StoreError::TransactionFailed("no transaction is open".to_string()).into(),
                );
            }
            conn.execute_batch("COMMIT")
                .map_err(|e| StoreError::TransactionFailed(e.to_string()).into())
        })
    }

    pub(crate) fn rollback(&self) -> Result<()> {
        self.with_conn(|conn| {
            if conn.is_autocommit() {
                return Ok(());
            }
            conn.execute_batch("ROLLBACK")
                .map_err(|e| StoreError::TransactionFailed(e.to_string()).into())
        })
    }

    pub(crate) fn close_connection(&self) -> Result<()> {
        let mut guard = self
            .conn
            .lock()
            .map_err(|_| StoreError::QueryFailed("connection lock poisoned".to_string()))?;
        match guard.take() {
            Some(conn) => conn
                .close()
                .map_err(|(_, e)| StoreError::QueryFailed(format!("close failed: {e}")).into()),
            None => Ok(()),
        }
    }
}

/// Persistent settings, written into the database file itself
fn configure_journal(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;",
    )?;
    debug!("SQLite journal configured (WAL mode)");
    Ok(())
}

/// Per-connection settings; safe on a read-only handle
fn configure_session_pragmas(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;",
    )?;
    Ok(())
}

fn initialize_schema(conn: &Connection, case_name: &str) -> rusqlite::Result<()> {
    conn.execute_batch(include_str!("schema.sql"))?;

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT OR REPLACE INTO tsk_db_info (name, value) VALUES (?1, ?2)",
        params![CASE_NAME_KEY, case_name],
    )?;
    {
        let mut stmt = tx.prepare_cached(
            "INSERT OR IGNORE INTO blackboard_artifact_types (artifact_type_id, type_name, display_name) \
             VALUES (?1, ?2, ?3)",
        )?;
        for (id, name, display) in BUILTIN_ARTIFACT_TYPES {
            stmt.execute(params![id, name, display])?;
        }
    }
    {
        let mut stmt = tx.prepare_cached(
            "INSERT OR IGNORE INTO blackboard_attribute_types \
             (attribute_type_id, type_name, display_name, value_type) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (id, name, display, value_type) in BUILTIN_ATTRIBUTE_TYPES {
            stmt.execute(params![id, name, display, value_type.code()])?;
        }
    }
    tx.commit()?;

    debug!(
        artifact_types = BUILTIN_ARTIFACT_TYPES.len(),
        attribute_types = BUILTIN_ATTRIBUTE_TYPES.len(),
        "Seeded built-in types"
    );
    Ok(())
}

/// Rejects anything but plain identifiers for names supplied by callers
pub(crate) fn checked_identifier(name: &str) -> Result<&str> {
    let valid = !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());
    if valid {
        Ok(name)
    } else {
        Err(StoreError::InvalidData(format!("invalid identifier '{name}'")).into())
    }
}

pub(crate) fn checked_key_value_table(table: &KeyValueTable) -> Result<(&str, &str, &str)> {
    Ok((
        checked_identifier(table.name)?,
        checked_identifier(table.key_column)?,
        checked_identifier(table.value_column)?,
    ))
}

fn open_failed(path: &Path, e: rusqlite::Error) -> PortableCaseError {
    StoreError::OpenFailed(format!("{}: {e}", path.display())).into()
}

pub(crate) fn query_failed(e: rusqlite::Error) -> PortableCaseError {
    StoreError::QueryFailed(e.to_string()).into()
}

pub(crate) fn insert_failed(e: rusqlite::Error) -> PortableCaseError {
    StoreError::InsertFailed(e.to_string()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_seeds_builtin_types() {
        let dir = TempDir::new().unwrap();
        let db = SqliteCaseDb::create(&dir.path().join("case.db"), "Case 1").unwrap();

        let count: i64 = db
            .with_conn(|conn| {
                conn.query_row("SELECT COUNT(*) FROM blackboard_artifact_types", [], |r| {
                    r.get(0)
                })
                .map_err(query_failed)
            })
            .unwrap();
        assert_eq!(count as usize, BUILTIN_ARTIFACT_TYPES.len());
        assert_eq!(db.read_case_name().unwrap(), "Case 1");
    }

    #[test]
    fn test_create_refuses_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("case.db");
        std::fs::write(&path, b"").unwrap();
        assert!(matches!(
            SqliteCaseDb::create(&path, "x"),
            Err(PortableCaseError::Store(StoreError::OpenFailed(_)))
        ));
    }

    #[test]
    fn test_open_rejects_non_case_database() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("other.db");
        Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE t (x INTEGER)")
            .unwrap();
        assert!(SqliteCaseDb::open(&path).is_err());
    }

    #[test]
    fn test_open_is_read_only_and_keeps_journal_mode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("case.db");
        drop(SqliteCaseDb::create(&path, "Case").unwrap());
        Connection::open(&path)
            .unwrap()
            .query_row("PRAGMA journal_mode = DELETE", [], |_| Ok(()))
            .unwrap();
        let before = std::fs::read(&path).unwrap();

        let db = SqliteCaseDb::open(&path).unwrap();
        let mode: String = db
            .with_conn(|conn| {
                conn.query_row("PRAGMA journal_mode", [], |r| r.get(0))
                    .map_err(query_failed)
            })
            .unwrap();
        assert_eq!(mode, "delete");
        assert!(db.add_examiner("examiner").is_err());
        drop(db);

        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_nested_transaction_is_rejected() {
        let dir = TempDir::new().unwrap();
        let db = SqliteCaseDb::create(&dir.path().join("case.db"), "Case").unwrap();
        db.begin().unwrap();
        assert!(matches!(
            db.begin(),
            Err(PortableCaseError::Store(StoreError::TransactionFailed(_)))
        ));
        db.rollback().unwrap();
        db.begin().unwrap();
        db.commit().unwrap();
    }

    #[test]
    fn test_closed_handle() {
        let dir = TempDir::new().unwrap();
        let db = SqliteCaseDb::create(&dir.path().join("case.db"), "Case").unwrap();
        db.close_connection().unwrap();
        db.close_connection().unwrap();
        assert!(matches!(
            db.read_case_name(),
            Err(PortableCaseError::Store(StoreError::Closed))
        ));
    }

    #[test]
    fn test_checked_identifier() {
        assert!(checked_identifier("portable_case_max_ids").is_ok());
        assert!(checked_identifier("x; DROP TABLE tsk_objects").is_err());
        assert!(checked_identifier("1abc").is_err());
        assert!(checked_identifier("").is_err());
    }
}
