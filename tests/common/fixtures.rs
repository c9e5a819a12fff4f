//! Fixture builders for pitch events, daily lines and stores.

#![allow(dead_code)]

use super::constants::*;
use chrono::NaiveDate;
use mlb_daily_stats::store::{HittingLine, PitchEvent, PitchingLine, SqliteStatsStore};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 8, d).unwrap()
}

/// A called ball from `pitcher` to `batter` at the given count.
pub fn pitch(
    date: NaiveDate,
    pitcher: (i64, &str),
    batter_id: i64,
    count: (i64, i64),
    pitch_type: Option<&str>,
) -> PitchEvent {
    PitchEvent {
        date,
        game_date: Some(date),
        player_id: Some(pitcher.0.to_string()),
        player_name: Some(pitcher.1.to_string()),
        pitcher: Some(pitcher.0.to_string()),
        batter: Some(batter_id.to_string()),
        pitcher_id: Some(pitcher.0),
        batter_id: Some(batter_id),
        game_pk: Some(GAME_PK),
        balls: Some(count.0),
        strikes: Some(count.1),
        pitch_type: pitch_type.map(str::to_string),
        description: Some("ball".to_string()),
        pitch_result_type: Some("B".to_string()),
        home_team: Some(HOME_TEAM.to_string()),
        away_team: Some(AWAY_TEAM.to_string()),
        stand: Some("R".to_string()),
        p_throws: Some("R".to_string()),
        release_speed: Some(98.5),
        release_spin_rate: Some(2400.0),
        ..Default::default()
    }
}

/// The final pitch of a plate appearance ending in `outcome`, put in play
/// with the given exit velocity and launch angle.
pub fn plate_appearance(
    date: NaiveDate,
    pitcher: (i64, &str),
    batter_id: i64,
    outcome: &str,
    launch: (Option<f64>, Option<f64>),
) -> PitchEvent {
    PitchEvent {
        events: Some(outcome.to_string()),
        description: Some("hit_into_play".to_string()),
        pitch_result_type: Some("X".to_string()),
        launch_speed: launch.0,
        launch_angle: launch.1,
        ..pitch(date, pitcher, batter_id, (1, 1), Some("FF"))
    }
}

pub fn hitting_line(date: NaiveDate, id: i64, name: &str) -> HittingLine {
    HittingLine {
        date,
        player_id: Some(id.to_string()),
        player_name: name.to_string(),
        team: Some(AWAY_TEAM.to_string()),
        games: Some(1),
        at_bats: Some(4),
        hits: Some(2),
        home_runs: Some(1),
        batting_avg: Some(0.5),
        ..Default::default()
    }
}

pub fn pitching_line(date: NaiveDate, id: i64, name: &str) -> PitchingLine {
    PitchingLine {
        date,
        player_id: Some(id.to_string()),
        player_name: name.to_string(),
        team: Some(HOME_TEAM.to_string()),
        games: Some(1),
        innings_pitched: Some(6.0),
        strikeouts: Some(9),
        era: Some(1.5),
        ..Default::default()
    }
}

/// A file-backed store that lives as long as this struct.
pub struct TestStore {
    pub store: Arc<SqliteStatsStore>,
    pub db_path: PathBuf,
    _temp_dir: TempDir,
}

pub fn temp_store() -> TestStore {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("mlb_data.db");
    let store = Arc::new(SqliteStatsStore::new(&db_path).unwrap());
    TestStore {
        store,
        db_path,
        _temp_dir: temp_dir,
    }
}
