mod models;
mod schema;
mod sqlite_stats_store;

pub use models::*;
pub use schema::{DATED_TABLES, STATS_VERSIONED_SCHEMAS};
pub use sqlite_stats_store::SqliteStatsStore;

use crate::players::PlayerIdentity;
use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Exactly `days` calendar days, the last one being `end`. The start
    /// is clamped to the earliest representable date.
    pub fn window_ending(end: NaiveDate, days: u32) -> Self {
        let span = days.max(1) as i64 - 1;
        Self {
            start: end
                .checked_sub_signed(chrono::Duration::days(span))
                .unwrap_or(NaiveDate::MIN),
            end,
        }
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    pub fn len(&self) -> usize {
        ((self.end - self.start).num_days() + 1).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

pub trait StatsStore: Send + Sync {
    // =========================================================================
    // Writes
    // =========================================================================

    /// Replaces every pitch event, hitting line and pitching line for `date`
    /// with the given batch, in a single transaction.
    fn replace_day(&self, date: NaiveDate, batch: &DayBatch) -> Result<DayWriteSummary>;

    /// Upserts the ledger row for the entry's data date (last write wins).
    fn record_update(&self, entry: &UpdateLedgerEntry) -> Result<()>;

    /// Keeps the lowest id of each group of pitch events sharing the natural
    /// key and deletes the rest. Returns the number of rows deleted.
    fn remove_duplicate_pitch_events(&self) -> Result<usize>;

    /// Deletes rows dated strictly before `cutoff` from all tables, atomically.
    fn remove_older_than(&self, cutoff: NaiveDate) -> Result<RetentionCounts>;

    /// Deletes every row from all tables, atomically.
    fn clear_all(&self) -> Result<RetentionCounts>;

    // =========================================================================
    // Ledger
    // =========================================================================

    fn get_update(&self, data_date: NaiveDate) -> Result<Option<UpdateLedgerEntry>>;

    /// All ledger rows, newest data date first.
    fn list_updates(&self) -> Result<Vec<UpdateLedgerEntry>>;

    // =========================================================================
    // Reads
    // =========================================================================

    fn count_pitch_events_on(&self, date: NaiveDate) -> Result<usize>;

    fn hitting_lines_for(&self, player: &PlayerIdentity, range: DateRange)
        -> Result<Vec<HittingLine>>;

    fn pitching_lines_for(
        &self,
        player: &PlayerIdentity,
        range: DateRange,
    ) -> Result<Vec<PitchingLine>>;

    fn pitch_events_for(&self, player: &PlayerIdentity, range: DateRange)
        -> Result<Vec<PitchEvent>>;

    fn league_averages(&self, date: NaiveDate) -> Result<LeagueAverages>;

    /// Every player id appearing as batter or pitcher, with appearance counts.
    fn pitch_event_players(&self) -> Result<Vec<PitchEventPlayer>>;

    /// Distinct pitcher names with their pitch counts, ordered by name.
    fn pitcher_names_with_counts(&self) -> Result<Vec<(String, usize)>>;

    fn summary(&self) -> Result<StoreSummary>;
}
