//! Upgrade steps shipped with the program
//!
//! To change the schema, add a step targeting `SCHEMA_VERSION + 1` to
//! [`STEPS`] and bump [`SCHEMA_VERSION`] to match.

use crate::database::core::{MigrationSet, MigrationStep, Result};

/// Latest schema version known to this build
pub const SCHEMA_VERSION: u32 = 0;

/// Registered steps, keyed by the version they produce
pub const STEPS: &[MigrationStep] = &[];

/// The validated step list for this build
pub fn migration_set() -> Result<MigrationSet> {
    MigrationSet::new(SCHEMA_VERSION, STEPS)
}
