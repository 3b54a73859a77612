#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! Spotlight Store - versioned SQLite storage for the community spotlight bot
//!
//! The store is a single local SQLite file. Its schema version lives in the
//! file header (`PRAGMA user_version`). Before anyone may use the store, the
//! first connection request runs the initialization sequence exactly once:
//!
//! 1. resolve the store path from configuration (`<cwd>/bot.db` by default)
//! 2. create the file at version 0 if it does not exist
//! 3. apply every missing upgrade step in one transaction and stamp the new version
//!
//! Every other subsystem only ever calls [`StoreHandle::get_connection`].
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | `cli` | Admin binary (`config`, `status`, `init`) | `clap`, `serde_json`, `tracing-subscriber` |
//!
//! The library itself always builds with only `rusqlite`, `config` and `tracing`
//! underneath:
//!
//! ```toml
//! spotlight-store = { version = "0.1", default-features = false }
//! ```
//!
//! # Architecture
//!
//! - **[`database`]**: store lifecycle
//!   - `core`: connection handle, version pragma, bootstrap, migration runner, errors
//!   - `migrations`: steps compiled into this build
//!   - `store`: `StoreHandle`
//!   - `types`: SQLite value adapters
//!
//! - **[`config`]**: configuration loading and store path resolution
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use spotlight_store::{StoreConfig, StoreHandle};
//! use std::sync::Arc;
//!
//! let config = StoreConfig::new(&None)?;
//! let store = Arc::new(StoreHandle::new(&config)?);
//!
//! let db = store.get_connection()?;
//! let ready = db.table_exists("threads")?;
//! ```

pub mod config;
pub mod database;

// =============================================================================
// Configuration
// =============================================================================

pub use config::{resolve_store_path, StoreConfig, DEFAULT_DB_FILE};

// =============================================================================
// Database Module - Re-export commonly used types
// =============================================================================

// Primary entry point
pub use database::{InitReport, StoreHandle, StoreInfo};

// Core database types
pub use database::{
    DatabaseConn, MigrationSet, MigrationStep, SchemaStatus, StepError, StoreError,
    UpgradeOutcome, SCHEMA_VERSION,
};

// Value adapters
pub use database::TextUuid;
