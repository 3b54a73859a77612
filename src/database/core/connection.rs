//! Database connection management
//!
//! This module provides the connection handle handed out to callers of the store.

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, OpenFlags};

use super::error::{Result, StoreError};

/// Default time a connection waits on a locked database before failing.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Connection handle to the store
///
/// `DatabaseConn` is a thin wrapper around a SQLite connection. Handles are
/// cheap, independent and never cached; drop one as soon as the work is done.
/// Opening a handle never creates the store file and never touches its schema.
pub struct DatabaseConn {
    pub conn: Connection,
}

impl DatabaseConn {
    /// Open a handle to an existing store file
    ///
    /// Fails with [`StoreError::StoreMissing`] if the file is absent.
    pub fn open_existing(path: &Path, busy_timeout: Duration) -> Result<Self> {
        if !path.exists() {
            return Err(StoreError::StoreMissing {
                path: path.to_path_buf(),
            });
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)?;

        let db = DatabaseConn { conn };
        db.configure(busy_timeout)?;
        Ok(db)
    }

    /// Open a read-only handle, skipping all tuning pragmas
    pub(crate) fn open_read_only(path: &Path) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)?;
        Ok(DatabaseConn { conn })
    }

    /// Create an in-memory database with the same tuning as file handles
    pub fn open_in_memory() -> Result<Self> {
        let db = DatabaseConn {
            conn: Connection::open_in_memory()?,
        };
        db.configure(DEFAULT_BUSY_TIMEOUT)?;
        Ok(db)
    }

    fn configure(&self, busy_timeout: Duration) -> Result<()> {
        // Set first so that the journal switch below waits on concurrent openers
        self.conn.busy_timeout(busy_timeout)?;

        // In-memory databases report "memory" here
        let _: String = self
            .conn
            .query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;

        self.conn.execute_batch(
            "PRAGMA synchronous=NORMAL;
             PRAGMA foreign_keys=ON;",
        )?;

        Ok(())
    }

    /// Execute a SQL statement
    pub fn execute(&self, sql: &str) -> Result<usize> {
        Ok(self.conn.execute(sql, [])?)
    }

    /// Check if a table exists in the database
    pub fn table_exists(&self, table_name: &str) -> Result<bool> {
        let count: i32 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [table_name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
