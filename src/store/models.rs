//! Data models for the stats database.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

/// Barrel classification: exit velocity >= 98 mph and launch angle in [26, 30].
/// A missing measurement is never a barrel.
pub fn is_barrel(launch_speed: Option<f64>, launch_angle: Option<f64>) -> bool {
    match (launch_speed, launch_angle) {
        (Some(speed), Some(angle)) => speed >= 98.0 && (26.0..=30.0).contains(&angle),
        _ => false,
    }
}

/// One player's aggregate hitting stats for a date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HittingLine {
    pub date: NaiveDate,
    pub player_id: Option<String>,
    pub player_name: String,
    pub team: Option<String>,
    pub games: Option<i64>,
    pub plate_appearances: Option<i64>,
    pub at_bats: Option<i64>,
    pub runs: Option<i64>,
    pub hits: Option<i64>,
    pub doubles: Option<i64>,
    pub triples: Option<i64>,
    pub home_runs: Option<i64>,
    pub rbi: Option<i64>,
    pub stolen_bases: Option<i64>,
    pub caught_stealing: Option<i64>,
    pub walks: Option<i64>,
    pub strikeouts: Option<i64>,
    pub batting_avg: Option<f64>,
    pub on_base_pct: Option<f64>,
    pub slugging_pct: Option<f64>,
    pub ops: Option<f64>,
    pub woba: Option<f64>,
    pub wrc_plus: Option<f64>,
    pub war: Option<f64>,
}

/// One player's aggregate pitching stats for a date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PitchingLine {
    pub date: NaiveDate,
    pub player_id: Option<String>,
    pub player_name: String,
    pub team: Option<String>,
    pub games: Option<i64>,
    pub games_started: Option<i64>,
    pub innings_pitched: Option<f64>,
    pub hits_allowed: Option<i64>,
    pub runs_allowed: Option<i64>,
    pub earned_runs: Option<i64>,
    pub home_runs_allowed: Option<i64>,
    pub walks_allowed: Option<i64>,
    pub strikeouts: Option<i64>,
    pub era: Option<f64>,
    pub whip: Option<f64>,
    pub fip: Option<f64>,
    pub xfip: Option<f64>,
    pub war: Option<f64>,
    pub saves: Option<i64>,
    pub holds: Option<i64>,
}

/// One pitch, projected to the stored column allow-list.
///
/// `player_name` is the pitcher's "Last, First" name; `batter` and `pitcher`
/// hold the raw provider ids as text, mirrored as integers in `batter_id`
/// and `pitcher_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PitchEvent {
    pub date: NaiveDate,
    pub player_id: Option<String>,
    pub player_name: Option<String>,
    pub pitch_type: Option<String>,
    pub game_date: Option<NaiveDate>,
    pub release_speed: Option<f64>,
    pub release_pos_x: Option<f64>,
    pub release_pos_y: Option<f64>,
    pub release_pos_z: Option<f64>,
    pub batter: Option<String>,
    pub pitcher: Option<String>,
    pub events: Option<String>,
    pub description: Option<String>,
    pub zone: Option<i64>,
    pub stand: Option<String>,
    pub p_throws: Option<String>,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub pitch_result_type: Option<String>, // stored as `type`: B, S or X
    pub hit_location: Option<i64>,
    pub bb_type: Option<String>,
    pub balls: Option<i64>,
    pub strikes: Option<i64>,
    pub pfx_x: Option<f64>,
    pub pfx_z: Option<f64>,
    pub plate_x: Option<f64>,
    pub plate_z: Option<f64>,
    pub vx0: Option<f64>,
    pub vy0: Option<f64>,
    pub vz0: Option<f64>,
    pub ax: Option<f64>,
    pub ay: Option<f64>,
    pub az: Option<f64>,
    pub sz_top: Option<f64>,
    pub sz_bot: Option<f64>,
    pub hit_distance_sc: Option<f64>,
    pub launch_speed: Option<f64>,
    pub launch_angle: Option<f64>,
    pub effective_speed: Option<f64>,
    pub release_spin_rate: Option<f64>,
    pub release_extension: Option<f64>,
    pub game_pk: Option<i64>,
    pub pitcher_id: Option<i64>,
    pub batter_id: Option<i64>,
    pub hc_x: Option<f64>,
    pub hc_y: Option<f64>,
    pub barrel: bool,
}

impl PitchEvent {
    /// Recomputes the derived barrel flag from the batted-ball measurements.
    pub fn with_barrel(mut self) -> Self {
        self.barrel = is_barrel(self.launch_speed, self.launch_angle);
        self
    }

    /// The seven-field natural key the table declares unique.
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey {
            date: self.date,
            game_pk: self.game_pk,
            pitcher_id: self.pitcher_id,
            batter_id: self.batter_id,
            balls: self.balls,
            strikes: self.strikes,
            pitch_type: self.pitch_type.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NaturalKey {
    pub date: NaiveDate,
    pub game_pk: Option<i64>,
    pub pitcher_id: Option<i64>,
    pub batter_id: Option<i64>,
    pub balls: Option<i64>,
    pub strikes: Option<i64>,
    pub pitch_type: Option<String>,
}

/// Everything the provider returned for one calendar day.
#[derive(Debug, Clone, Default)]
pub struct DayBatch {
    pub pitch_events: Vec<PitchEvent>,
    pub hitting: Vec<HittingLine>,
    pub pitching: Vec<PitchingLine>,
}

impl DayBatch {
    pub fn is_empty(&self) -> bool {
        self.pitch_events.is_empty() && self.hitting.is_empty() && self.pitching.is_empty()
    }
}

/// Rows written by a whole-day replacement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DayWriteSummary {
    pub pitch_events_written: usize,
    /// Pitch events dropped because another row in the batch had the same natural key.
    pub pitch_events_collided: usize,
    pub hitting_lines_written: usize,
    pub pitching_lines_written: usize,
    /// Rows of any kind deleted for the date before inserting.
    pub rows_replaced: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerStatus {
    Success,
    /// The provider had nothing for the day. Not an error.
    NoData,
    Error(String),
}

impl LedgerStatus {
    pub fn parse(s: &str) -> Self {
        match s.strip_prefix("error: ") {
            Some(message) => LedgerStatus::Error(message.to_string()),
            None if s == "success" => LedgerStatus::Success,
            None if s == "no data" => LedgerStatus::NoData,
            None => LedgerStatus::Error(s.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, LedgerStatus::Success | LedgerStatus::NoData)
    }
}

impl fmt::Display for LedgerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerStatus::Success => write!(f, "success"),
            LedgerStatus::NoData => write!(f, "no data"),
            LedgerStatus::Error(message) => write!(f, "error: {}", message),
        }
    }
}

/// Outcome of one fetch run for one data date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateLedgerEntry {
    pub update_date: NaiveDate,
    pub data_date: NaiveDate,
    pub records_added: i64,
    pub status: LedgerStatus,
}

/// Rows deleted per table by a retention sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RetentionCounts {
    pub hitting: usize,
    pub pitching: usize,
    pub pitch_events: usize,
    pub ledger: usize,
}

impl RetentionCounts {
    pub fn total(&self) -> usize {
        self.hitting + self.pitching + self.pitch_events + self.ledger
    }
}

/// Coverage of the pitch event table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreSummary {
    pub oldest_date: Option<NaiveDate>,
    pub newest_date: Option<NaiveDate>,
    pub days_covered: usize,
    pub total_records: usize,
}

/// League-wide averages for one date.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LeagueAverages {
    pub avg_batting_avg: Option<f64>,
    pub avg_obp: Option<f64>,
    pub avg_slg: Option<f64>,
    pub avg_ops: Option<f64>,
    pub avg_era: Option<f64>,
    pub avg_whip: Option<f64>,
}

/// A player id seen in the pitch event table and the roles it appeared in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PitchEventPlayer {
    pub id: i64,
    pub as_batter: usize,
    pub as_pitcher: usize,
}
