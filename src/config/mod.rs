// src/config/mod.rs
mod models;

pub use models::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Reads and validates a config file. The format follows the extension:
/// `.yaml`/`.yml` parse as YAML, anything else as JSON.
pub async fn load_config(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read config file {}", path.display()))?;

    let config: Config = match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(&contents).context("failed to parse YAML config")?
        }
        _ => serde_json::from_str(&contents).context("failed to parse JSON config")?,
    };

    config.validate()?;
    Ok(config)
}
