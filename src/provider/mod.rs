//! Remote statistics source.

mod feed;
mod stats;
mod statsapi;

pub use stats::{outs_from_innings_notation, BattingCounts, PitchingCounts};
pub use statsapi::StatsApiClient;

use crate::store::{DayBatch, HittingLine, PitchingLine};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_STATS_API_BASE_URL: &str = "https://statsapi.mlb.com";

/// Errors that can occur when talking to the statistics provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

/// One entry of the provider's player register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerEntry {
    pub id: i64,
    /// "First Last"
    pub full_name: String,
    /// "Last, First"
    pub last_first_name: String,
}

/// Source of game data, queried one calendar day at a time.
pub trait StatsSource: Send + Sync {
    /// Every pitch plus per-player hitting and pitching lines for the final
    /// games played on `date`. A day without games yields an empty batch.
    fn fetch_day(&self, date: NaiveDate) -> Result<DayBatch, ProviderError>;

    /// Season-to-date hitting lines for the season containing `as_of`,
    /// dated `as_of`.
    fn season_hitting(&self, as_of: NaiveDate) -> Result<Vec<HittingLine>, ProviderError>;

    /// Season-to-date pitching lines for the season containing `as_of`,
    /// dated `as_of`.
    fn season_pitching(&self, as_of: NaiveDate) -> Result<Vec<PitchingLine>, ProviderError>;
}

/// Player id/name register.
pub trait PlayerRegistry: Send + Sync {
    fn load_players(&self) -> Result<Vec<PlayerEntry>, ProviderError>;
}
