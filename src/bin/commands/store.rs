use anyhow::{anyhow, Result};
use spotlight_store::{StoreConfig, StoreHandle};

fn open(config: &StoreConfig) -> Result<StoreHandle> {
    StoreHandle::new(config).map_err(|e| anyhow!("Failed to set up store: {}", e))
}

pub fn status(config: &StoreConfig, json: bool) -> Result<()> {
    let info = open(config)?.info();

    if json {
        println!("{}", super::to_json(&info)?);
        return Ok(());
    }

    println!("Path:               {}", info.path);
    println!("Exists:             {}", info.exists);
    if let Some(size) = info.size_bytes {
        println!("Size:               {} bytes", size);
    }
    match info.schema_version {
        Some(v) => println!("Schema Version:     v{} (program v{})", v, info.code_version),
        None => println!("Schema Version:     - (program v{})", info.code_version),
    }
    if let Some(status) = info.status {
        println!("Status:             {}", status);
    }
    Ok(())
}

pub fn init(config: &StoreConfig, json: bool) -> Result<()> {
    let store = open(config)?;
    let report = *store
        .ensure_ready()
        .map_err(|e| anyhow!("Store initialization failed: {}", e))?;

    if json {
        println!("{}", super::to_json(&report)?);
        return Ok(());
    }

    if report.created {
        println!("Created store at {}", store.path().display());
    }
    if report.steps_applied > 0 || report.from_version != report.to_version {
        println!(
            "Upgraded schema v{} -> v{} ({} step(s))",
            report.from_version, report.to_version, report.steps_applied
        );
    } else {
        println!("Store schema is up to date (v{})", report.to_version);
    }
    Ok(())
}
