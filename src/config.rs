use anyhow::{anyhow, Result};
use config::Config;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name used when no store location is configured
pub const DEFAULT_DB_FILE: &str = "bot.db";

/// Config file read from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "spotlight.toml";

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

pub struct StoreConfig {
    /// Path to the store file; empty means `<cwd>/bot.db`
    pub db_location: String,

    /// How long a connection waits on a locked store, in milliseconds (default: 5 seconds)
    pub busy_timeout_ms: u64,
}

const EMPTY_CONFIG: &str = r#"### spotlight store configuration file

### path to the SQLite store; empty means ./bot.db
# db_location = "/var/lib/spotlight/bot.db"

### how long a connection waits on a locked store (in milliseconds)
# busy_timeout_ms = 5000
"#;

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_location: String::new(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl StoreConfig {
    /// Function to create and initialize a new configuration
    pub fn new(path: &Option<String>) -> Result<StoreConfig> {
        let mut builder = Config::builder();

        // Add in toml configuration file
        match path {
            Some(p) => {
                let path = Path::new(p.as_str());
                if path.exists() {
                    let path_str = path
                        .to_str()
                        .ok_or_else(|| anyhow!("Could not convert path to string"))?;
                    builder = builder.add_source(config::File::with_name(path_str));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG)
                        .map_err(|e| anyhow!("Unable to create config file {}: {}", p, e))?;
                }
            }
            None => {
                if Path::new(DEFAULT_CONFIG_FILE).exists() {
                    builder = builder.add_source(config::File::with_name(DEFAULT_CONFIG_FILE));
                }
            }
        }

        // Add in settings from the environment (with a prefix of SPOTLIGHT)
        // E.g., `SPOTLIGHT_DB_LOCATION=/data/bot.db ./spotlight-store` would set the store path
        builder = builder.add_source(config::Environment::with_prefix("SPOTLIGHT"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let config = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        let db_location = config.get("db_location").cloned().unwrap_or_default();

        let busy_timeout_ms = match config.get("busy_timeout_ms") {
            Some(s) => s
                .trim()
                .parse()
                .map_err(|e| anyhow!("Invalid busy_timeout_ms '{}': {}", s, e))?,
            None => DEFAULT_BUSY_TIMEOUT_MS,
        };

        Ok(StoreConfig {
            db_location,
            busy_timeout_ms,
        })
    }

    /// Get the path to the store file
    pub fn store_path(&self) -> PathBuf {
        resolve_store_path(&self.db_location)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Display configuration summary
    pub fn summary(&self) -> String {
        let configured = if self.db_location.trim().is_empty() {
            "(default)".to_string()
        } else {
            self.db_location.clone()
        };
        [
            format!("DB Location:        {}", configured),
            format!("Store Path:         {}", self.store_path().display()),
            format!("Busy Timeout:       {} ms", self.busy_timeout_ms),
        ]
        .join("\n")
    }
}

/// Resolve the store file path from the configured location
///
/// An empty or whitespace-only location resolves to `bot.db` in the current
/// working directory. Anything else is used verbatim.
pub fn resolve_store_path(configured: &str) -> PathBuf {
    if configured.trim().is_empty() {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        cwd.join(DEFAULT_DB_FILE)
    } else {
        PathBuf::from(configured)
    }
}
