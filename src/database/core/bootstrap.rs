//! Store creation
//!
//! Creates the store file on first use and stamps it with the base schema
//! version so the migration runner can take it from there.

use std::fs::OpenOptions;
use std::io::{self, ErrorKind};
use std::path::Path;

use rusqlite::Connection;
use tracing::{debug, info};

use super::error::{Result, StoreError};
use super::schema::write_version;

/// Version a freshly created store starts at; every step above it will run.
pub const BASE_VERSION: u32 = 0;

/// Make sure a store file exists at `path`
///
/// Returns `true` if the file was created by this call. Missing parent
/// directories are created as well. An existing file is left untouched; an
/// existing path that is not a regular file is a [`StoreError::FileSystem`].
pub fn ensure_store_exists(path: &Path) -> Result<bool> {
    if let Ok(metadata) = std::fs::metadata(path) {
        if !metadata.is_file() {
            return Err(StoreError::FileSystem {
                path: path.to_path_buf(),
                source: io::Error::new(
                    ErrorKind::InvalidInput,
                    "store path is not a regular file",
                ),
            });
        }
        debug!("Store already exists at {}", path.display());
        return Ok(false);
    }

    info!("Creating store at {}", path.display());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| StoreError::FileSystem {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(source) => {
            return Err(StoreError::FileSystem {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    let mut conn = Connection::open(path)?;
    let tx = conn.transaction()?;
    write_version(&tx, BASE_VERSION)?;
    tx.commit()?;

    Ok(true)
}
