// src/config/models.rs
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::net::SocketAddr;
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    pub components: Vec<ComponentConfig>,
}

/// One probe target: where to reach it and how long to wait for it.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentConfig {
    pub name: String,
    pub url: Url,
    #[serde(default = "default_check_path")]
    pub check_path: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_check_path() -> String {
    "/healthz".to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr
            .parse::<SocketAddr>()
            .context("Invalid listen_addr")?;

        let mut seen = HashSet::new();
        for component in &self.components {
            if component.name.is_empty() {
                bail!("Component with empty name");
            }
            if !seen.insert(component.name.as_str()) {
                bail!("Duplicate component name: {}", component.name);
            }
            if component.timeout_secs == 0 {
                bail!("Component {} has zero timeout", component.name);
            }
        }
        Ok(())
    }
}
