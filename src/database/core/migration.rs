//! Migration runner
//!
//! Upgrade steps are plain functions keyed by the version they produce. The
//! runner applies every version between the persisted one and the compiled
//! one, in order, inside a single transaction, and advances the persisted
//! version in that same transaction. Either the whole run lands or none of it
//! does.
//!
//! A version with no registered step is applied as an empty step. Such gaps
//! are reported by [`MigrationSet::gaps`] and logged when the runner starts.

use rusqlite::{Connection, Transaction};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::error::{Result, StepError, StoreError};
use super::schema::{read_version, write_version};

/// Body of a migration step: receives its target version and the upgrade transaction.
pub type StepFn = fn(u32, &Transaction<'_>) -> std::result::Result<(), StepError>;

/// A single upgrade step
#[derive(Clone, Copy)]
pub struct MigrationStep {
    pub version: u32,
    pub name: &'static str,
    pub apply: StepFn,
}

impl MigrationStep {
    pub const fn new(version: u32, name: &'static str, apply: StepFn) -> Self {
        Self {
            version,
            name,
            apply,
        }
    }
}

impl std::fmt::Debug for MigrationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationStep")
            .field("version", &self.version)
            .field("name", &self.name)
            .finish()
    }
}

/// Ordered, validated list of upgrade steps plus the version they lead to
#[derive(Debug, Clone)]
pub struct MigrationSet {
    current_version: u32,
    steps: Vec<MigrationStep>,
}

impl MigrationSet {
    /// Build a step list targeting `current_version`
    ///
    /// Steps may be given in any order. Rejects version 0, duplicate versions
    /// and steps above `current_version`.
    pub fn new(current_version: u32, steps: &[MigrationStep]) -> Result<Self> {
        let mut steps = steps.to_vec();
        steps.sort_by_key(|s| s.version);

        for pair in steps.windows(2) {
            if pair[0].version == pair[1].version {
                return Err(StoreError::InvalidMigrations(format!(
                    "version {} is registered twice ({} and {})",
                    pair[0].version, pair[0].name, pair[1].name
                )));
            }
        }
        if let Some(step) = steps.iter().find(|s| s.version == 0) {
            return Err(StoreError::InvalidMigrations(format!(
                "step {} targets version 0, which is the base version",
                step.name
            )));
        }
        if let Some(step) = steps.iter().find(|s| s.version > current_version) {
            return Err(StoreError::InvalidMigrations(format!(
                "step {} targets version {} above current version {}",
                step.name, step.version, current_version
            )));
        }

        Ok(Self {
            current_version,
            steps,
        })
    }

    /// A step list with no steps, targeting `current_version`
    pub fn empty(current_version: u32) -> Self {
        Self {
            current_version,
            steps: Vec::new(),
        }
    }

    pub fn current_version(&self) -> u32 {
        self.current_version
    }

    pub fn steps(&self) -> &[MigrationStep] {
        &self.steps
    }

    /// The step registered for `version`, if any
    pub fn step_for(&self, version: u32) -> Option<&MigrationStep> {
        self.steps
            .binary_search_by_key(&version, |s| s.version)
            .ok()
            .map(|idx| &self.steps[idx])
    }

    /// Versions in `1..=current_version` with no registered step
    pub fn gaps(&self) -> Vec<u32> {
        (1..=self.current_version)
            .filter(|v| self.step_for(*v).is_none())
            .collect()
    }
}

/// What an upgrade run did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpgradeOutcome {
    pub from_version: u32,
    pub to_version: u32,
    /// Number of registered steps executed (empty versions are not counted)
    pub steps_applied: usize,
}

/// Bring the store up to `migrations.current_version()`
///
/// A store already at or past the current version is left untouched.
pub fn upgrade_if_needed(
    conn: &mut Connection,
    migrations: &MigrationSet,
) -> Result<UpgradeOutcome> {
    let target = migrations.current_version();
    let persisted = read_version(conn)?;

    if persisted >= target {
        if persisted > target {
            warn!(
                "Store schema v{} is ahead of program schema v{}, leaving it untouched",
                persisted, target
            );
        } else {
            debug!("Store schema is up to date (v{})", persisted);
        }
        return Ok(UpgradeOutcome {
            from_version: persisted,
            to_version: persisted,
            steps_applied: 0,
        });
    }

    for gap in migrations.gaps().into_iter().filter(|v| *v > persisted) {
        warn!("No migration step registered for v{}, applying as empty", gap);
    }

    info!("Upgrading store from v{} to v{}", persisted, target);

    let tx = conn.transaction()?;
    let mut steps_applied = 0;

    for version in (persisted + 1)..=target {
        let Some(step) = migrations.step_for(version) else {
            debug!("v{} has no step", version);
            continue;
        };

        info!("Upgrading store to version {} ({})", version, step.name);
        if let Err(source) = (step.apply)(version, &tx) {
            warn!("Migration v{} failed, rolling back to v{}", version, persisted);
            // Dropping the transaction rolls back every step of this run
            drop(tx);
            return Err(StoreError::MigrationStep {
                version,
                name: step.name,
                source,
            });
        }
        steps_applied += 1;
    }

    write_version(&tx, target)?;
    tx.commit()?;

    info!("Store upgraded to v{} ({} step(s) applied)", target, steps_applied);
    Ok(UpgradeOutcome {
        from_version: persisted,
        to_version: target,
        steps_applied,
    })
}
