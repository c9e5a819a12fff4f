//! In-memory stand-ins for the Stats API.

#![allow(dead_code)]

use chrono::NaiveDate;
use mlb_daily_stats::provider::{PlayerEntry, PlayerRegistry, ProviderError, StatsSource};
use mlb_daily_stats::store::{DayBatch, HittingLine, PitchingLine};
use std::collections::HashMap;
use std::sync::Mutex;

enum Scripted {
    Batch(DayBatch),
    Fail(u16),
}

/// Source answering from scripted days. Unscripted days have no games.
#[derive(Default)]
pub struct FakeSource {
    days: Mutex<HashMap<NaiveDate, Scripted>>,
    calls: Mutex<Vec<NaiveDate>>,
    season_hitting: Vec<HittingLine>,
    season_pitching: Vec<PitchingLine>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_day(self, date: NaiveDate, batch: DayBatch) -> Self {
        self.set_day(date, batch);
        self
    }

    pub fn with_failure(self, date: NaiveDate, status: u16) -> Self {
        self.days
            .lock()
            .unwrap()
            .insert(date, Scripted::Fail(status));
        self
    }

    pub fn with_season(mut self, hitting: Vec<HittingLine>, pitching: Vec<PitchingLine>) -> Self {
        self.season_hitting = hitting;
        self.season_pitching = pitching;
        self
    }

    /// Replaces what the source returns for `date`, e.g. for a corrected feed.
    pub fn set_day(&self, date: NaiveDate, batch: DayBatch) {
        self.days
            .lock()
            .unwrap()
            .insert(date, Scripted::Batch(batch));
    }

    pub fn calls(&self) -> Vec<NaiveDate> {
        self.calls.lock().unwrap().clone()
    }
}

impl StatsSource for FakeSource {
    fn fetch_day(&self, date: NaiveDate) -> Result<DayBatch, ProviderError> {
        self.calls.lock().unwrap().push(date);
        match self.days.lock().unwrap().get(&date) {
            Some(Scripted::Batch(batch)) => Ok(batch.clone()),
            Some(Scripted::Fail(status)) => Err(ProviderError::Status {
                status: *status,
                url: format!("/api/v1/schedule?date={}", date),
            }),
            None => Ok(DayBatch::default()),
        }
    }

    fn season_hitting(&self, as_of: NaiveDate) -> Result<Vec<HittingLine>, ProviderError> {
        Ok(self
            .season_hitting
            .iter()
            .cloned()
            .map(|line| HittingLine {
                date: as_of,
                ..line
            })
            .collect())
    }

    fn season_pitching(&self, as_of: NaiveDate) -> Result<Vec<PitchingLine>, ProviderError> {
        Ok(self
            .season_pitching
            .iter()
            .cloned()
            .map(|line| PitchingLine {
                date: as_of,
                ..line
            })
            .collect())
    }
}

/// Registry that either serves a fixed player list or fails every load.
pub struct FakeRegistry {
    players: Option<Vec<PlayerEntry>>,
    loads: Mutex<usize>,
}

impl FakeRegistry {
    pub fn with_players(players: &[(i64, &str, &str)]) -> Self {
        let players = players
            .iter()
            .map(|(id, first, last)| PlayerEntry {
                id: *id,
                full_name: format!("{} {}", first, last),
                last_first_name: format!("{}, {}", last, first),
            })
            .collect();
        Self {
            players: Some(players),
            loads: Mutex::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            players: None,
            loads: Mutex::new(0),
        }
    }

    pub fn loads(&self) -> usize {
        *self.loads.lock().unwrap()
    }
}

impl PlayerRegistry for FakeRegistry {
    fn load_players(&self) -> Result<Vec<PlayerEntry>, ProviderError> {
        *self.loads.lock().unwrap() += 1;
        self.players.clone().ok_or(ProviderError::Status {
            status: 503,
            url: "/api/v1/sports/1/players".to_string(),
        })
    }
}
