//! Read side over the stats database.

use crate::players::{normalize_name, PlayerDirectory, PlayerIdentity};
use crate::store::{
    DateRange, HittingLine, LeagueAverages, PitchEvent, PitchingLine, StatsStore, StoreSummary,
    UpdateLedgerEntry,
};
use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Lookback used when no range is given.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 45;

/// Everything stored for one player over a date range, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerData {
    pub player: PlayerIdentity,
    pub range: DateRange,
    pub hitting: Vec<HittingLine>,
    pub pitching: Vec<PitchingLine>,
    pub pitch_events: Vec<PitchEvent>,
}

impl PlayerData {
    pub fn is_empty(&self) -> bool {
        self.hitting.is_empty() && self.pitching.is_empty() && self.pitch_events.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlayerRole {
    Hitter,
    Pitcher,
    TwoWay,
}

impl fmt::Display for PlayerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerRole::Hitter => write!(f, "hitter"),
            PlayerRole::Pitcher => write!(f, "pitcher"),
            PlayerRole::TwoWay => write!(f, "two-way"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailablePlayer {
    pub id: i64,
    pub name: String,
    pub role: PlayerRole,
    pub pitches_seen: usize,
    pub pitches_thrown: usize,
}

/// Result of a player listing. When the directory cannot be loaded the
/// listing degrades to pitcher names and pitch counts from the pitch table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerListing {
    Classified(Vec<AvailablePlayer>),
    PitchersOnly(Vec<(String, usize)>),
}

impl PlayerListing {
    pub fn len(&self) -> usize {
        match self {
            PlayerListing::Classified(players) => players.len(),
            PlayerListing::PitchersOnly(pitchers) => pitchers.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn matches_search(name: &str, search: Option<&str>) -> bool {
    match search {
        Some(term) => normalize_name(name).contains(&normalize_name(term)),
        None => true,
    }
}

pub struct QueryFacade {
    store: Arc<dyn StatsStore>,
    directory: PlayerDirectory,
}

impl QueryFacade {
    pub fn new(store: Arc<dyn StatsStore>, directory: PlayerDirectory) -> Self {
        Self { store, directory }
    }

    pub fn directory(&self) -> &PlayerDirectory {
        &self.directory
    }

    pub fn resolve(&self, name: &str) -> PlayerIdentity {
        self.directory.resolve(name)
    }

    /// Daily lines and pitch events for a player. `range` defaults to the
    /// last `DEFAULT_LOOKBACK_DAYS` days up to `today`.
    pub fn player_data(
        &self,
        player: &PlayerIdentity,
        range: Option<DateRange>,
        today: NaiveDate,
    ) -> Result<PlayerData> {
        let range =
            range.unwrap_or_else(|| DateRange::window_ending(today, DEFAULT_LOOKBACK_DAYS));
        let data = PlayerData {
            player: player.clone(),
            range,
            hitting: self.store.hitting_lines_for(player, range)?,
            pitching: self.store.pitching_lines_for(player, range)?,
            pitch_events: self.store.pitch_events_for(player, range)?,
        };
        debug!(
            "Player data for {}: {} hitting, {} pitching, {} pitch events",
            player,
            data.hitting.len(),
            data.pitching.len(),
            data.pitch_events.len()
        );
        Ok(data)
    }

    pub fn league_averages(&self, date: NaiveDate) -> Result<LeagueAverages> {
        self.store.league_averages(date)
    }

    pub fn summary(&self) -> Result<StoreSummary> {
        self.store.summary()
    }

    /// The `limit` most recent ledger entries by data date, newest first.
    pub fn latest_updates(&self, limit: usize) -> Result<Vec<UpdateLedgerEntry>> {
        let mut updates = self.store.list_updates()?;
        updates.truncate(limit);
        Ok(updates)
    }

    /// Players present in the pitch table, optionally filtered by a
    /// case-insensitive substring of their name.
    pub fn available_players(&self, search: Option<&str>) -> Result<PlayerListing> {
        if let Err(err) = self.directory.load() {
            warn!(
                "Player directory unavailable, listing pitchers only: {:#}",
                err
            );
            let pitchers = self
                .store
                .pitcher_names_with_counts()?
                .into_iter()
                .filter(|(name, _)| matches_search(name, search))
                .collect();
            return Ok(PlayerListing::PitchersOnly(pitchers));
        }

        let mut players = Vec::new();
        for seen in self.store.pitch_event_players()? {
            let Some(name) = self.directory.name_for(seen.id)? else {
                debug!("Player {} is not in the directory", seen.id);
                continue;
            };
            if !matches_search(&name, search) {
                continue;
            }
            let role = match (seen.as_batter > 0, seen.as_pitcher > 0) {
                (true, true) => PlayerRole::TwoWay,
                (false, true) => PlayerRole::Pitcher,
                _ => PlayerRole::Hitter,
            };
            players.push(AvailablePlayer {
                id: seen.id,
                name,
                role,
                pitches_seen: seen.as_batter,
                pitches_thrown: seen.as_pitcher,
            });
        }
        players.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(PlayerListing::Classified(players))
    }
}
