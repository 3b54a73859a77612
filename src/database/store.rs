//! Store lifecycle manager
//!
//! [`StoreHandle`] is the single entry point the rest of the application uses to
//! reach the store. The first call to [`StoreHandle::get_connection`] runs the
//! initialization sequence (bootstrap, then migrate); concurrent callers block
//! until it finishes. Later calls skip straight to opening a handle.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::config::StoreConfig;
use crate::database::core::{
    check_status, ensure_store_exists, upgrade_if_needed, DatabaseConn, MigrationSet, Result,
    SchemaStatus, StoreError, DEFAULT_BUSY_TIMEOUT,
};
use crate::database::migrations::migration_set;

/// Outcome of the one-time initialization sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InitReport {
    /// Whether the store file was created during initialization
    pub created: bool,
    pub from_version: u32,
    pub to_version: u32,
    pub steps_applied: usize,
}

/// Read-only view of the store on disk
#[derive(Debug, Clone, Serialize)]
pub struct StoreInfo {
    pub path: String,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<u32>,
    pub code_version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SchemaStatus>,
}

type InitOutcome = std::result::Result<InitReport, Arc<StoreError>>;

/// Lifecycle manager for one store file
///
/// Construct one per process and share it (e.g. behind an `Arc`).
pub struct StoreHandle {
    path: PathBuf,
    busy_timeout: Duration,
    migrations: MigrationSet,
    init: OnceLock<InitOutcome>,
}

impl StoreHandle {
    /// Create a handle for the store described by `config`, using the
    /// migration steps compiled into this build
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let store = Self::with_migrations(config.store_path(), migration_set()?)
            .with_busy_timeout(config.busy_timeout());
        Ok(store)
    }

    /// Create a handle for the store at `path` with an explicit step list
    pub fn with_migrations(path: impl Into<PathBuf>, migrations: MigrationSet) -> Self {
        let path = path.into();
        info!("DB Location {}", path.display());
        Self {
            path,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            migrations,
            init: OnceLock::new(),
        }
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Schema version this build expects
    pub fn code_version(&self) -> u32 {
        self.migrations.current_version()
    }

    /// Run the initialization sequence if it has not run yet
    ///
    /// Only one caller ever runs it; everyone else waits for and shares its
    /// outcome. A failure is final for the lifetime of this handle: the caller
    /// that ran the sequence gets the error as-is, every other caller gets
    /// [`StoreError::InitializationFailed`] wrapping a copy of it.
    pub fn ensure_ready(&self) -> Result<&InitReport> {
        let mut failure = None;
        let outcome = self.init.get_or_init(|| {
            self.initialize().map_err(|e| {
                let shared = Arc::new(e.detached());
                failure = Some(e);
                shared
            })
        });

        if let Some(e) = failure {
            return Err(e);
        }
        outcome
            .as_ref()
            .map_err(|e| StoreError::InitializationFailed(Arc::clone(e)))
    }

    /// Get a new connection to a ready store
    ///
    /// Every call returns an independent handle; close it promptly.
    pub fn get_connection(&self) -> Result<DatabaseConn> {
        self.ensure_ready()?;
        DatabaseConn::open_existing(&self.path, self.busy_timeout)
    }

    /// Describe the store on disk without initializing it
    pub fn info(&self) -> StoreInfo {
        let exists = self.path.exists();
        let size_bytes = if exists {
            std::fs::metadata(&self.path).ok().map(|m| m.len())
        } else {
            None
        };

        let (schema_version, status) = if exists {
            match DatabaseConn::open_read_only(&self.path) {
                Ok(db) => {
                    let status = check_status(&db.conn, self.code_version()).ok();
                    let version = status.as_ref().map(|s| match s {
                        SchemaStatus::Current => self.code_version(),
                        SchemaStatus::NeedsMigration { from, .. } => *from,
                        SchemaStatus::Incompatible {
                            database_version, ..
                        } => *database_version,
                    });
                    (version, status)
                }
                Err(_) => (None, None),
            }
        } else {
            (None, None)
        };

        StoreInfo {
            path: self.path.to_string_lossy().to_string(),
            exists,
            size_bytes,
            schema_version,
            code_version: self.code_version(),
            status,
        }
    }

    fn initialize(&self) -> Result<InitReport> {
        let created = ensure_store_exists(&self.path)?;

        let mut db = DatabaseConn::open_existing(&self.path, self.busy_timeout)?;
        let outcome = upgrade_if_needed(&mut db.conn, &self.migrations)?;

        Ok(InitReport {
            created,
            from_version: outcome.from_version,
            to_version: outcome.to_version,
            steps_applied: outcome.steps_applied,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::core::{read_version, write_version, MigrationStep, StepError};
    use rusqlite::{Connection, Transaction};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn create_table(version: u32, tx: &Transaction<'_>) -> std::result::Result<(), StepError> {
        tx.execute_batch(&format!("CREATE TABLE step_{} (id INTEGER PRIMARY KEY)", version))?;
        Ok(())
    }

    fn broken(_: u32, _: &Transaction<'_>) -> std::result::Result<(), StepError> {
        Err("thread table constraint violated".into())
    }

    fn persisted_version(path: &Path) -> u32 {
        let conn = Connection::open(path).unwrap();
        read_version(&conn).unwrap()
    }

    #[test]
    fn test_fresh_store_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot.db");
        let store = StoreHandle::with_migrations(&path, MigrationSet::empty(0));

        let db = store.get_connection().unwrap();
        assert!(path.exists());
        drop(db);

        let report = *store.ensure_ready().unwrap();
        assert_eq!(
            report,
            InitReport {
                created: true,
                from_version: 0,
                to_version: 0,
                steps_applied: 0,
            }
        );

        // Second call reuses the recorded outcome
        let db = store.get_connection().unwrap();
        assert!(db.execute("CREATE TABLE scratch (id INTEGER)").is_ok());
        assert_eq!(*store.ensure_ready().unwrap(), report);
        assert_eq!(persisted_version(&path), 0);
    }

    #[test]
    fn test_second_process_start_is_a_no_op() {
        static RUNS: AtomicUsize = AtomicUsize::new(0);
        fn counted(version: u32, tx: &Transaction<'_>) -> std::result::Result<(), StepError> {
            RUNS.fetch_add(1, Ordering::SeqCst);
            create_table(version, tx)
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot.db");
        let steps = [MigrationStep::new(1, "counted", counted)];

        let first = StoreHandle::with_migrations(&path, MigrationSet::new(1, &steps).unwrap());
        assert_eq!(first.ensure_ready().unwrap().steps_applied, 1);

        let second = StoreHandle::with_migrations(&path, MigrationSet::new(1, &steps).unwrap());
        let report = second.ensure_ready().unwrap();

        assert!(!report.created);
        assert_eq!(report.steps_applied, 0);
        assert_eq!(RUNS.load(Ordering::SeqCst), 1);
        assert_eq!(persisted_version(&path), 1);
    }

    #[test]
    fn test_version_never_decreases() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot.db");
        let steps = [
            MigrationStep::new(1, "one", create_table),
            MigrationStep::new(2, "two", create_table),
            MigrationStep::new(3, "three", create_table),
        ];

        let newer = StoreHandle::with_migrations(&path, MigrationSet::new(3, &steps).unwrap());
        newer.get_connection().unwrap();
        assert_eq!(persisted_version(&path), 3);

        let older = StoreHandle::with_migrations(&path, MigrationSet::new(1, &steps[..1]).unwrap());
        older.get_connection().unwrap();
        assert_eq!(persisted_version(&path), 3);
        assert_eq!(
            older.info().status,
            Some(SchemaStatus::Incompatible {
                database_version: 3,
                required_version: 1,
            })
        );
    }

    #[test]
    fn test_failed_upgrade_leaves_store_at_prior_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot.db");
        let set = MigrationSet::new(
            3,
            &[
                MigrationStep::new(1, "one", create_table),
                MigrationStep::new(2, "broken", broken),
                MigrationStep::new(3, "three", create_table),
            ],
        )
        .unwrap();
        let store = StoreHandle::with_migrations(&path, set);

        // The caller that ran the upgrade sees the step error itself
        let err = store.get_connection().err().unwrap();
        assert!(matches!(
            err,
            StoreError::MigrationStep {
                version: 2,
                name: "broken",
                ..
            }
        ));

        // The failure is final; no retry happens on the next call
        let again = store.get_connection().err().unwrap();
        assert!(matches!(again, StoreError::InitializationFailed(_)));
        assert!(matches!(
            again.root(),
            StoreError::MigrationStep { version: 2, .. }
        ));

        assert_eq!(persisted_version(&path), 0);
        let conn = Connection::open(&path).unwrap();
        let tables: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name LIKE 'step_%'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 0);
    }

    #[test]
    fn test_concurrent_first_use_initializes_once() {
        static RUNS: AtomicUsize = AtomicUsize::new(0);
        fn counted(version: u32, tx: &Transaction<'_>) -> std::result::Result<(), StepError> {
            RUNS.fetch_add(1, Ordering::SeqCst);
            create_table(version, tx)
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot.db");
        let set = MigrationSet::new(1, &[MigrationStep::new(1, "counted", counted)]).unwrap();
        let store = Arc::new(StoreHandle::with_migrations(&path, set));

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let db = store.get_connection()?;
                    db.table_exists("step_1")
                })
            })
            .collect();

        for worker in workers {
            assert!(worker.join().unwrap().unwrap());
        }

        assert_eq!(RUNS.load(Ordering::SeqCst), 1);
        let report = store.ensure_ready().unwrap();
        assert!(report.created);
        assert_eq!(report.steps_applied, 1);
        assert_eq!(persisted_version(&path), 1);
    }

    #[test]
    fn test_directory_location_fails_with_filesystem_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = StoreHandle::with_migrations(dir.path(), MigrationSet::empty(0));

        let err = store.get_connection().err().unwrap();
        assert!(matches!(err, StoreError::FileSystem { .. }));

        let again = store.get_connection().err().unwrap();
        assert!(matches!(again.root(), StoreError::FileSystem { .. }));
    }

    #[test]
    fn test_missing_store_after_initialization() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot.db");
        let store = StoreHandle::with_migrations(&path, MigrationSet::empty(0));

        drop(store.get_connection().unwrap());
        std::fs::remove_file(&path).unwrap();

        let result = store.get_connection();
        assert!(matches!(result, Err(StoreError::StoreMissing { .. })));
    }

    #[test]
    fn test_info_does_not_initialize() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot.db");
        let store = StoreHandle::with_migrations(&path, MigrationSet::empty(2));

        let info = store.info();
        assert!(!info.exists);
        assert_eq!(info.schema_version, None);
        assert!(!path.exists());

        {
            let conn = Connection::open(&path).unwrap();
            write_version(&conn, 1).unwrap();
        }
        let info = store.info();
        assert!(info.exists);
        assert_eq!(info.schema_version, Some(1));
        assert_eq!(info.status, Some(SchemaStatus::NeedsMigration { from: 1, to: 2 }));
    }

    #[test]
    fn test_new_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            db_location: dir.path().join("custom.db").to_string_lossy().to_string(),
            busy_timeout_ms: 250,
        };

        let store = StoreHandle::new(&config).unwrap();
        assert_eq!(store.path(), dir.path().join("custom.db"));
        assert_eq!(store.code_version(), crate::database::SCHEMA_VERSION);
        store.get_connection().unwrap();
    }
}
