use crate::ingest::{FetchDriver, RangeReport};
use crate::store::{format_date, DateRange, StatsStore, StoreSummary};
use anyhow::Result;
use chrono::{Duration, NaiveDate};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct RegenerationReport {
    pub range: DateRange,
    pub fetch: RangeReport,
    pub summary: StoreSummary,
}

/// The `window_days` days ending yesterday.
pub fn backfill_range(today: NaiveDate, window_days: u32) -> DateRange {
    DateRange::window_ending(today - Duration::days(1), window_days)
}

/// Wipes every table in one transaction, then refetches the trailing window.
pub fn regenerate(
    store: Arc<dyn StatsStore>,
    driver: &FetchDriver,
    today: NaiveDate,
    window_days: u32,
) -> Result<RegenerationReport> {
    let cleared = store.clear_all()?;
    warn!("Cleared {} rows from the stats database", cleared.total());

    let range = backfill_range(today, window_days);
    info!(
        "Regenerating {} days from {} to {}",
        range.len(),
        format_date(range.start),
        format_date(range.end)
    );
    let fetch = driver.fetch_range(range);
    let summary = store.summary()?;

    Ok(RegenerationReport {
        range,
        fetch,
        summary,
    })
}
