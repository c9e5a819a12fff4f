//! Text and JSON artifacts built from stored and season stats.

mod player_report;
mod social_post;
mod top_performers;

pub use player_report::{
    safe_file_stem, KeyMetrics, PlayerInfo, PlayerReport, Position, StatLine,
};
pub use social_post::{social_post, write_social_post, SOCIAL_POST_FILE};
pub use top_performers::{HitterLeader, PitcherLeader, TopPerformers, QUALIFYING_INNINGS};

use crate::provider::StatsSource;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub top: TopPerformers,
    pub post_path: PathBuf,
}

/// Season-to-date leaders as of `date`, written as a social post to `dir`.
pub fn daily_report(source: &dyn StatsSource, date: NaiveDate, dir: &Path) -> Result<DailyReport> {
    let hitting = source
        .season_hitting(date)
        .context("Failed to fetch season hitting stats")?;
    let pitching = source
        .season_pitching(date)
        .context("Failed to fetch season pitching stats")?;
    info!(
        "Identifying top performers among {} hitters and {} pitchers",
        hitting.len(),
        pitching.len()
    );

    let top = TopPerformers::identify(&hitting, &pitching);
    let post_path = write_social_post(dir, date, &top)?;
    Ok(DailyReport {
        date,
        top,
        post_path,
    })
}
