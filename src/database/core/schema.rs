//! Persisted schema version
//!
//! The schema version lives in the SQLite header (`PRAGMA user_version`), not in
//! a table, so it is readable on any store including an empty one.

use rusqlite::Connection;
use serde::Serialize;

use super::error::{Result, StoreError};

/// Read the persisted schema version
pub fn read_version(conn: &Connection) -> Result<u32> {
    let raw: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    u32::try_from(raw).map_err(|_| StoreError::InvalidVersion(raw))
}

/// Write the persisted schema version
///
/// Call this on a transaction so the marker commits together with the
/// schema changes it describes.
pub fn write_version(conn: &Connection, version: u32) -> Result<()> {
    // user_version is a signed 32-bit field
    let value = i32::try_from(version).map_err(|_| StoreError::InvalidVersion(version.into()))?;
    conn.execute_batch(&format!("PRAGMA user_version = {}", value))?;
    Ok(())
}

/// Compare the persisted version with the version compiled into the program
pub fn check_status(conn: &Connection, code_version: u32) -> Result<SchemaStatus> {
    let database_version = read_version(conn)?;

    let status = if database_version == code_version {
        SchemaStatus::Current
    } else if database_version < code_version {
        SchemaStatus::NeedsMigration {
            from: database_version,
            to: code_version,
        }
    } else {
        SchemaStatus::Incompatible {
            database_version,
            required_version: code_version,
        }
    };
    Ok(status)
}

/// Status of the store schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SchemaStatus {
    /// Schema matches the code
    Current,

    /// Schema needs migration from an older version
    NeedsMigration { from: u32, to: u32 },

    /// Store was written by a newer version of the program
    Incompatible {
        database_version: u32,
        required_version: u32,
    },
}

impl std::fmt::Display for SchemaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaStatus::Current => write!(f, "current"),
            SchemaStatus::NeedsMigration { from, to } => {
                write!(f, "needs migration (v{} -> v{})", from, to)
            }
            SchemaStatus::Incompatible {
                database_version,
                required_version,
            } => write!(
                f,
                "ahead of program (store v{}, program v{})",
                database_version, required_version
            ),
        }
    }
}
