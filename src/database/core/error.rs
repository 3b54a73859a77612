//! Error types for the store lifecycle
//!
//! Every failure the lifecycle can produce surfaces as a [`StoreError`]. None of
//! them are retried: a broken store is fatal to initialization and the caller
//! decides whether to abort the process.

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Error returned by a migration step body.
pub type StepError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while locating, bootstrapping, migrating or
/// connecting to the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store file (or its parent directory) could not be created or opened.
    #[error("failed to create or open store at '{}': {source}", .path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An upgrade step failed; the whole upgrade run was rolled back.
    #[error("migration step v{version} ({name}) failed: {source}")]
    MigrationStep {
        version: u32,
        name: &'static str,
        #[source]
        source: StepError,
    },

    /// A connection was requested but the store file is gone.
    #[error("store file does not exist: '{}'", .path.display())]
    StoreMissing { path: PathBuf },

    /// The persisted version is not a valid non-negative integer.
    #[error("invalid persisted schema version: {0}")]
    InvalidVersion(i64),

    /// The compiled step list is malformed.
    #[error("invalid migration list: {0}")]
    InvalidMigrations(String),

    /// Any other SQLite failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Initialization already ran in this process and failed.
    #[error("store initialization failed: {0}")]
    InitializationFailed(#[source] Arc<StoreError>),
}

impl StoreError {
    /// The underlying cause, looking through [`StoreError::InitializationFailed`].
    pub fn root(&self) -> &StoreError {
        match self {
            StoreError::InitializationFailed(inner) => inner.root(),
            other => other,
        }
    }

    /// A copy of this error that can be shared with every later caller
    ///
    /// Sources that cannot be cloned keep their kind or code and their message.
    pub(crate) fn detached(&self) -> StoreError {
        match self {
            StoreError::FileSystem { path, source } => StoreError::FileSystem {
                path: path.clone(),
                source: std::io::Error::new(source.kind(), source.to_string()),
            },
            StoreError::MigrationStep {
                version,
                name,
                source,
            } => StoreError::MigrationStep {
                version: *version,
                name: *name,
                source: source.to_string().into(),
            },
            StoreError::StoreMissing { path } => StoreError::StoreMissing { path: path.clone() },
            StoreError::InvalidVersion(v) => StoreError::InvalidVersion(*v),
            StoreError::InvalidMigrations(msg) => StoreError::InvalidMigrations(msg.clone()),
            StoreError::Sqlite(rusqlite::Error::SqliteFailure(code, msg)) => {
                StoreError::Sqlite(rusqlite::Error::SqliteFailure(*code, msg.clone()))
            }
            StoreError::Sqlite(other) => StoreError::Sqlite(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
                Some(other.to_string()),
            )),
            StoreError::InitializationFailed(inner) => {
                StoreError::InitializationFailed(Arc::clone(inner))
            }
        }
    }
}

/// Convenience type alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_unwraps_initialization_failure() {
        let inner = Arc::new(StoreError::StoreMissing {
            path: PathBuf::from("/tmp/missing.db"),
        });
        let err = StoreError::InitializationFailed(inner);

        assert!(matches!(err.root(), StoreError::StoreMissing { .. }));
        assert!(err.to_string().contains("/tmp/missing.db"));
    }

    #[test]
    fn test_detached_keeps_variant_and_message() {
        let err = StoreError::FileSystem {
            path: PathBuf::from("/srv/bot.db"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let copy = err.detached();

        match &copy {
            StoreError::FileSystem { path, source } => {
                assert_eq!(path, &PathBuf::from("/srv/bot.db"));
                assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
            }
            other => panic!("expected FileSystem error, got {other:?}"),
        }
        assert_eq!(copy.to_string(), err.to_string());

        let step = StoreError::MigrationStep {
            version: 4,
            name: "add_threads",
            source: "boom".into(),
        };
        assert_eq!(step.detached().to_string(), step.to_string());
    }

    #[test]
    fn test_step_error_message() {
        let err = StoreError::MigrationStep {
            version: 2,
            name: "add_threads",
            source: "constraint violated".into(),
        };
        assert_eq!(
            err.to_string(),
            "migration step v2 (add_threads) failed: constraint violated"
        );
    }
}
