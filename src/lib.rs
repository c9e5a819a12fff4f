//! MLB daily stats retention library
//!
//! Keeps a rolling window of per-pitch and per-player daily statistics in
//! SQLite, refreshed one day at a time from the MLB Stats API, and builds
//! player and daily reports from it.

pub mod cli_style;
pub mod config;
pub mod ingest;
pub mod maintenance;
pub mod players;
pub mod provider;
pub mod query;
pub mod report;
pub mod sqlite_persistence;
pub mod store;

// Re-export commonly used types for convenience
pub use config::{AppConfig, CliConfig, FileConfig};
pub use ingest::{DayOutcome, DayStatus, FetchDriver, RangeReport};
pub use maintenance::RetentionSweeper;
pub use players::{PlayerDirectory, PlayerIdentity};
pub use provider::{PlayerRegistry, ProviderError, StatsApiClient, StatsSource};
pub use query::QueryFacade;
pub use store::{DateRange, SqliteStatsStore, StatsStore};
