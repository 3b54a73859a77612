use anyhow::Result;
use serde::Serialize;
use spotlight_store::{StoreConfig, SCHEMA_VERSION};

#[derive(Debug, Serialize)]
struct ConfigInfo {
    db_location: String,
    store_path: String,
    busy_timeout_ms: u64,
    schema_version: u32,
}

pub fn run(config: &StoreConfig, json: bool) -> Result<()> {
    if json {
        let info = ConfigInfo {
            db_location: config.db_location.clone(),
            store_path: config.store_path().to_string_lossy().to_string(),
            busy_timeout_ms: config.busy_timeout_ms,
            schema_version: SCHEMA_VERSION,
        };
        println!("{}", super::to_json(&info)?);
    } else {
        println!("{}", config.summary());
        println!("Schema Version:     {}", SCHEMA_VERSION);
    }
    Ok(())
}
