//! Core database infrastructure
//!
//! This module provides the building blocks of the store lifecycle:
//! - `DatabaseConn`: connection handle handed out to callers
//! - `schema`: persisted version read/write and `SchemaStatus`
//! - `bootstrap`: store file creation
//! - `migration`: ordered, transactional upgrade steps
//! - `StoreError`: the error taxonomy

mod bootstrap;
mod connection;
mod error;
mod migration;
mod schema;

pub use bootstrap::{ensure_store_exists, BASE_VERSION};
pub use connection::{DatabaseConn, DEFAULT_BUSY_TIMEOUT};
pub use error::{Result, StepError, StoreError};
pub use migration::{upgrade_if_needed, MigrationSet, MigrationStep, StepFn, UpgradeOutcome};
pub use schema::{check_status, read_version, write_version, SchemaStatus};
