//! Per-player report built from stored pitch events.

use crate::query::PlayerData;
use crate::store::{format_date, PitchEvent};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Plate appearance outcomes that count as an official at-bat.
const AT_BAT_EVENTS: &[&str] = &[
    "single",
    "double",
    "triple",
    "home_run",
    "field_out",
    "strikeout",
    "force_out",
    "grounded_into_double_play",
    "field_error",
    "pop_out",
    "flyout",
    "lineout",
];

const HIT_EVENTS: &[&str] = &["single", "double", "triple", "home_run"];

/// Outcomes credited as one out to the pitcher.
const OUT_EVENTS: &[&str] = &[
    "strikeout",
    "field_out",
    "force_out",
    "grounded_into_double_play",
    "pop_out",
    "flyout",
];

const RECENT_GAMES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Position {
    Pitcher,
    Hitter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerInfo {
    pub name: String,
    pub position: Position,
    pub team: Option<String>,
    pub bats: Option<String>,
    pub throws: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatLine {
    Hitter {
        label: String,
        at_bats: usize,
        hits: usize,
        home_runs: usize,
        avg: f64,
        slg: f64,
    },
    Pitcher {
        label: String,
        innings: f64,
        strikeouts: usize,
        pitches: usize,
    },
}

impl StatLine {
    fn hitter(label: String, events: &[&PitchEvent]) -> Self {
        let outcomes: Vec<&str> = events.iter().filter_map(|e| e.events.as_deref()).collect();
        let count = |names: &[&str]| outcomes.iter().filter(|o| names.contains(o)).count();

        let at_bats = count(AT_BAT_EVENTS);
        let hits = count(HIT_EVENTS);
        let doubles = count(&["double"]);
        let triples = count(&["triple"]);
        let home_runs = count(&["home_run"]);
        let total_bases = hits + doubles + 2 * triples + 3 * home_runs;
        let rate = |n: usize| {
            if at_bats > 0 {
                n as f64 / at_bats as f64
            } else {
                0.0
            }
        };

        StatLine::Hitter {
            label,
            at_bats,
            hits,
            home_runs,
            avg: rate(hits),
            slg: rate(total_bases),
        }
    }

    fn pitcher(label: String, events: &[&PitchEvent]) -> Self {
        let outcome_count = |names: &[&str]| {
            events
                .iter()
                .filter_map(|e| e.events.as_deref())
                .filter(|o| names.contains(o))
                .count()
        };
        StatLine::Pitcher {
            label,
            innings: outcome_count(OUT_EVENTS) as f64 / 3.0,
            strikeouts: outcome_count(&["strikeout"]),
            pitches: events.len(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KeyMetrics {
    pub avg_exit_velocity: Option<f64>,
    /// Percentage of batted balls classified as barrels.
    pub barrel_rate: Option<f64>,
    pub avg_velocity: Option<f64>,
    pub avg_spin_rate: Option<f64>,
    /// Swinging strikes per pitch thrown, as a percentage, by pitch type.
    pub whiff_rate_by_pitch: BTreeMap<String, f64>,
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n > 0 {
        Some(sum / n as f64)
    } else {
        None
    }
}

impl KeyMetrics {
    fn compute(as_hitter: &[&PitchEvent], as_pitcher: &[&PitchEvent]) -> Self {
        let batted: Vec<&&PitchEvent> = as_hitter
            .iter()
            .filter(|e| e.launch_speed.is_some() && e.launch_angle.is_some())
            .collect();
        let barrel_rate = if batted.is_empty() {
            None
        } else {
            let barrels = batted.iter().filter(|e| e.barrel).count();
            Some(barrels as f64 / batted.len() as f64 * 100.0)
        };

        let mut thrown: BTreeMap<String, (usize, usize)> = BTreeMap::new();
        for e in as_pitcher {
            let Some(pitch_type) = e.pitch_type.as_ref() else {
                continue;
            };
            let entry = thrown.entry(pitch_type.clone()).or_default();
            entry.0 += 1;
            if e
                .description
                .as_deref()
                .is_some_and(|d| d.contains("swinging_strike"))
            {
                entry.1 += 1;
            }
        }

        KeyMetrics {
            avg_exit_velocity: mean(as_hitter.iter().filter_map(|e| e.launch_speed)),
            barrel_rate,
            avg_velocity: mean(as_pitcher.iter().filter_map(|e| e.release_speed)),
            avg_spin_rate: mean(as_pitcher.iter().filter_map(|e| e.release_spin_rate)),
            whiff_rate_by_pitch: thrown
                .into_iter()
                .map(|(pitch, (total, whiffs))| (pitch, whiffs as f64 / total as f64 * 100.0))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerReport {
    pub info: PlayerInfo,
    pub range_start: NaiveDate,
    pub range_end: NaiveDate,
    /// Most recent game dates first.
    pub recent_games: Vec<StatLine>,
    pub window_total: StatLine,
    pub metrics: KeyMetrics,
}

/// "Judge, Aaron" becomes "Judge_Aaron".
pub fn safe_file_stem(name: &str) -> String {
    name.replace(' ', "_").replace(',', "")
}

impl PlayerReport {
    /// Builds the report, or `None` when the player has no pitch events.
    pub fn build(data: &PlayerData) -> Option<Self> {
        let recent = data.pitch_events.first()?;
        let player = &data.player;

        let is_batter = |e: &PitchEvent| player.id.is_some() && e.batter_id == player.id;
        let is_pitcher = |e: &PitchEvent| {
            e.player_name.as_deref() == Some(player.name.as_str())
                || (player.id.is_some() && e.pitcher_id == player.id)
        };
        let as_hitter: Vec<&PitchEvent> = data.pitch_events.iter().filter(|e| is_batter(e)).collect();
        let as_pitcher: Vec<&PitchEvent> =
            data.pitch_events.iter().filter(|e| is_pitcher(e)).collect();

        let position = if as_pitcher.is_empty() {
            Position::Hitter
        } else {
            Position::Pitcher
        };
        let primarily_hitter = as_hitter.len() >= as_pitcher.len();
        let own_events = if primarily_hitter { &as_hitter } else { &as_pitcher };

        let mut game_dates: Vec<NaiveDate> = data
            .pitch_events
            .iter()
            .map(|e| e.game_date.unwrap_or(e.date))
            .collect();
        game_dates.sort_unstable_by(|a, b| b.cmp(a));
        game_dates.dedup();

        let mut recent_games = Vec::new();
        for game_date in game_dates.into_iter().take(RECENT_GAMES) {
            let in_game: Vec<&PitchEvent> = own_events
                .iter()
                .copied()
                .filter(|e| e.game_date.unwrap_or(e.date) == game_date)
                .collect();
            if in_game.is_empty() {
                continue;
            }
            let label = format_date(game_date);
            recent_games.push(if primarily_hitter {
                StatLine::hitter(label, &in_game)
            } else {
                StatLine::pitcher(label, &in_game)
            });
        }

        let total_label = format!("{}-Day Total", data.range.len());
        let window_total = if primarily_hitter {
            StatLine::hitter(total_label, own_events)
        } else {
            StatLine::pitcher(total_label, own_events)
        };

        Some(PlayerReport {
            info: PlayerInfo {
                name: player.name.clone(),
                position,
                team: recent.home_team.clone(),
                bats: recent.stand.clone(),
                throws: recent.p_throws.clone(),
            },
            range_start: data.range.start,
            range_end: data.range.end,
            recent_games,
            window_total,
            metrics: KeyMetrics::compute(&as_hitter, &as_pitcher),
        })
    }

    pub fn file_name(&self) -> String {
        format!("{}_report.json", safe_file_stem(&self.info.name))
    }

    pub fn write_json(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.file_name());
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write report to {:?}", path))?;
        Ok(path)
    }
}
