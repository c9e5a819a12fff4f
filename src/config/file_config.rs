use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Storage (can override CLI)
    pub db_path: Option<String>,
    pub output_dir: Option<String>,
    pub retention_days: Option<u32>,
    pub backfill_days: Option<u32>,

    // Provider
    pub stats_api_base_url: Option<String>,
    pub http_timeout_sec: Option<u64>,
    pub user_agent: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
