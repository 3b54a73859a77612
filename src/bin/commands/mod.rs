pub mod config;
pub mod store;

pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> Result<String, anyhow::Error> {
    Ok(serde_json::to_string_pretty(value)?)
}
