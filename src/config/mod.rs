mod file_config;

pub use file_config::FileConfig;

use crate::maintenance::DEFAULT_RETENTION_DAYS;
use crate::provider::DEFAULT_STATS_API_BASE_URL;
use anyhow::{bail, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DB_PATH: &str = "mlb_data.db";
pub const DEFAULT_HTTP_TIMEOUT_SEC: u64 = 30;
/// Upper bound for the retention and backfill windows (ten years).
pub const MAX_WINDOW_DAYS: u32 = 3650;

pub fn default_user_agent() -> String {
    format!(
        "{}/{} ( daily stats retention )",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )
}

/// CLI arguments that can be used for config resolution.
/// Every field here can be overridden by the TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub retention_days: Option<u32>,
    pub backfill_days: Option<u32>,
    pub stats_api_base_url: Option<String>,
    pub http_timeout_sec: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub output_dir: PathBuf,
    pub retention_days: u32,
    pub backfill_days: u32,
    pub stats_api_base_url: String,
    pub http_timeout_sec: u64,
    pub user_agent: String,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));
        if db_path.is_dir() {
            bail!("db_path is a directory: {:?}", db_path);
        }
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                bail!("Database directory does not exist: {:?}", parent);
            }
        }

        let output_dir = file
            .output_dir
            .map(PathBuf::from)
            .or_else(|| cli.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."));
        if !output_dir.is_dir() {
            bail!("Output directory does not exist: {:?}", output_dir);
        }

        let retention_days = file
            .retention_days
            .or(cli.retention_days)
            .unwrap_or(DEFAULT_RETENTION_DAYS);
        let backfill_days = file
            .backfill_days
            .or(cli.backfill_days)
            .unwrap_or(retention_days);
        if !(1..=MAX_WINDOW_DAYS).contains(&retention_days) {
            bail!("retention_days must be between 1 and {}", MAX_WINDOW_DAYS);
        }
        if !(1..=MAX_WINDOW_DAYS).contains(&backfill_days) {
            bail!("backfill_days must be between 1 and {}", MAX_WINDOW_DAYS);
        }

        let stats_api_base_url = file
            .stats_api_base_url
            .or_else(|| cli.stats_api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_STATS_API_BASE_URL.to_string());
        if !stats_api_base_url.starts_with("http://") && !stats_api_base_url.starts_with("https://")
        {
            bail!("stats_api_base_url must be an http(s) URL: {}", stats_api_base_url);
        }

        let http_timeout_sec = file
            .http_timeout_sec
            .or(cli.http_timeout_sec)
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SEC);
        let user_agent = file
            .user_agent
            .or_else(|| cli.user_agent.clone())
            .unwrap_or_else(default_user_agent);

        Ok(Self {
            db_path,
            output_dir,
            retention_days,
            backfill_days,
            stats_api_base_url: stats_api_base_url.trim_end_matches('/').to_string(),
            http_timeout_sec,
            user_agent,
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_sec)
    }
}
