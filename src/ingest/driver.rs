//! Fetch-and-upsert driver.
//!
//! Each calendar day is fetched from the source and written as a whole-day
//! replacement. Whatever happens, the day's ledger row is written and the
//! driver moves on: failures are recorded, never propagated or retried.

use super::IngestError;
use crate::provider::StatsSource;
use crate::store::{
    format_date, DateRange, LedgerStatus, PitchEvent, StatsStore, UpdateLedgerEntry,
};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DayStatus {
    Success { records: usize },
    NoData,
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayOutcome {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub status: DayStatus,
}

impl DayOutcome {
    pub fn records(&self) -> usize {
        match self.status {
            DayStatus::Success { records } => records,
            _ => 0,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, DayStatus::Failed { .. })
    }
}

/// Per-day outcomes of a range fetch, in date order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RangeReport {
    pub outcomes: Vec<DayOutcome>,
}

impl RangeReport {
    pub fn total_records(&self) -> usize {
        self.outcomes.iter().map(DayOutcome::records).sum()
    }

    pub fn failed(&self) -> impl Iterator<Item = &DayOutcome> {
        self.outcomes.iter().filter(|o| o.is_failed())
    }

    pub fn no_data_days(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == DayStatus::NoData)
            .count()
    }
}

pub struct FetchDriver {
    store: Arc<dyn StatsStore>,
    source: Arc<dyn StatsSource>,
}

impl FetchDriver {
    pub fn new(store: Arc<dyn StatsStore>, source: Arc<dyn StatsSource>) -> Self {
        Self { store, source }
    }

    fn load_day(&self, date: NaiveDate) -> Result<DayStatus, IngestError> {
        let mut batch = self.source.fetch_day(date)?;
        if batch.is_empty() {
            return Ok(DayStatus::NoData);
        }
        batch.pitch_events = batch
            .pitch_events
            .into_iter()
            .map(PitchEvent::with_barrel)
            .collect();

        let summary = self
            .store
            .replace_day(date, &batch)
            .map_err(IngestError::Store)?;
        Ok(DayStatus::Success {
            records: summary.pitch_events_written,
        })
    }

    /// Fetches and stores one day. Never fails: errors end up in the outcome
    /// and in the ledger.
    pub fn fetch_day(&self, date: NaiveDate) -> DayOutcome {
        let date_str = format_date(date);
        info!("Fetching data for {}", date_str);

        let status = match self.load_day(date) {
            Ok(status) => status,
            Err(err) => {
                error!("Error fetching data for {}: {}", date_str, err);
                DayStatus::Failed {
                    message: err.to_string(),
                }
            }
        };

        let (records_added, ledger_status) = match &status {
            DayStatus::Success { records } => {
                info!("Added {} records for {}", records, date_str);
                (*records as i64, LedgerStatus::Success)
            }
            DayStatus::NoData => {
                info!("No data available for {}", date_str);
                (0, LedgerStatus::NoData)
            }
            DayStatus::Failed { message } => (0, LedgerStatus::Error(message.clone())),
        };

        let entry = UpdateLedgerEntry {
            update_date: Local::now().date_naive(),
            data_date: date,
            records_added,
            status: ledger_status,
        };
        if let Err(err) = self.store.record_update(&entry) {
            error!("Failed to record ledger entry for {}: {:#}", date_str, err);
        }

        DayOutcome { date, status }
    }

    /// Fetches every day of the range in order, continuing past failures.
    pub fn fetch_range(&self, range: DateRange) -> RangeReport {
        let report = RangeReport {
            outcomes: range.days().map(|date| self.fetch_day(date)).collect(),
        };
        info!(
            "Fetched {} days from {} to {}: {} records, {} without data, {} failed",
            report.outcomes.len(),
            format_date(range.start),
            format_date(range.end),
            report.total_records(),
            report.no_data_days(),
            report.failed().count()
        );
        report
    }
}
