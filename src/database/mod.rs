//! Database module
//!
//! This module provides the store lifecycle, organized into:
//!
//! - **core**: SQLite connection handle, persisted version, bootstrap and migration runner
//! - **migrations**: upgrade steps compiled into this build
//! - **store**: `StoreHandle`, the one entry point the rest of the application uses
//! - **types**: SQLite value adapters
//!
//! # Architecture
//!
//! ```text
//! database/
//! ├── core/            # Foundation
//! │   ├── connection   # DatabaseConn handle
//! │   ├── schema       # PRAGMA user_version, SchemaStatus
//! │   ├── bootstrap    # store file creation
//! │   ├── migration    # MigrationSet and the upgrade runner
//! │   └── error        # StoreError
//! ├── migrations       # shipped steps, SCHEMA_VERSION
//! ├── store            # StoreHandle (init once, then hand out connections)
//! └── types            # TextUuid
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use spotlight_store::{StoreConfig, StoreHandle};
//!
//! let config = StoreConfig::new(&None)?;
//! let store = StoreHandle::new(&config)?;
//!
//! // First call creates and upgrades the store; later calls just connect
//! let db = store.get_connection()?;
//! db.execute("SELECT 1")?;
//! ```
//!
//! # Adding a schema change
//!
//! ```rust,ignore
//! fn add_threads(_version: u32, tx: &rusqlite::Transaction<'_>) -> Result<(), StepError> {
//!     tx.execute_batch("CREATE TABLE threads (id TEXT PRIMARY KEY, replies INTEGER NOT NULL)")?;
//!     Ok(())
//! }
//!
//! pub const SCHEMA_VERSION: u32 = 1;
//! pub const STEPS: &[MigrationStep] = &[MigrationStep::new(1, "add_threads", add_threads)];
//! ```

pub mod core;
pub mod migrations;
pub mod store;
pub mod types;

pub use core::{
    check_status, ensure_store_exists, read_version, upgrade_if_needed, write_version,
    DatabaseConn, MigrationSet, MigrationStep, Result, SchemaStatus, StepError, StepFn,
    StoreError, UpgradeOutcome, BASE_VERSION, DEFAULT_BUSY_TIMEOUT,
};
pub use migrations::{migration_set, SCHEMA_VERSION, STEPS};
pub use store::{InitReport, StoreHandle, StoreInfo};
pub use types::TextUuid;
