//! Rolling retention window.
//!
//! Removes every row older than the window from all four tables as a single
//! transaction.

use crate::store::{format_date, RetentionCounts, StatsStore};
use anyhow::{anyhow, Result};
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_RETENTION_DAYS: u32 = 45;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Rows dated strictly before this day were deleted.
    pub cutoff: NaiveDate,
    pub deleted: RetentionCounts,
}

pub struct RetentionSweeper {
    store: Arc<dyn StatsStore>,
    window_days: u32,
}

impl RetentionSweeper {
    pub fn new(store: Arc<dyn StatsStore>, window_days: u32) -> Self {
        Self { store, window_days }
    }

    pub fn window_days(&self) -> u32 {
        self.window_days
    }

    pub fn cutoff(&self, today: NaiveDate) -> Result<NaiveDate> {
        today
            .checked_sub_signed(Duration::days(self.window_days as i64))
            .ok_or_else(|| {
                anyhow!(
                    "Retention window of {} days reaches before the earliest date",
                    self.window_days
                )
            })
    }

    pub fn sweep(&self, today: NaiveDate) -> Result<SweepReport> {
        let cutoff = self.cutoff(today)?;
        let deleted = self.store.remove_older_than(cutoff)?;

        if deleted.total() > 0 {
            info!(
                "Removed data older than {}: {} hitting, {} pitching, {} pitch events, {} ledger rows",
                format_date(cutoff),
                deleted.hitting,
                deleted.pitching,
                deleted.pitch_events,
                deleted.ledger
            );
        } else {
            info!("No data older than {} to remove", format_date(cutoff));
        }

        Ok(SweepReport { cutoff, deleted })
    }
}
