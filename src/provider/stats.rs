//! Counting stats as the Stats API reports them, and the rate stats derived
//! from them.

use crate::store::{HittingLine, PitchingLine};
use chrono::NaiveDate;
use serde::Deserialize;

/// Linear weights for wOBA.
const WOBA_UNINTENTIONAL_WALK: f64 = 0.696;
const WOBA_HIT_BY_PITCH: f64 = 0.726;
const WOBA_SINGLE: f64 = 0.883;
const WOBA_DOUBLE: f64 = 1.244;
const WOBA_TRIPLE: f64 = 1.569;
const WOBA_HOME_RUN: f64 = 2.004;

const FIP_CONSTANT: f64 = 3.10;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BattingCounts {
    pub games_played: i64,
    pub plate_appearances: i64,
    pub at_bats: i64,
    pub runs: i64,
    pub hits: i64,
    pub doubles: i64,
    pub triples: i64,
    pub home_runs: i64,
    pub rbi: i64,
    pub stolen_bases: i64,
    pub caught_stealing: i64,
    pub base_on_balls: i64,
    pub intentional_walks: i64,
    pub strike_outs: i64,
    pub hit_by_pitch: i64,
    pub sac_flies: i64,
}

impl BattingCounts {
    pub fn has_appearance(&self) -> bool {
        self.plate_appearances > 0 || self.at_bats > 0
    }

    pub fn merge(&mut self, other: &BattingCounts) {
        self.games_played += other.games_played;
        self.plate_appearances += other.plate_appearances;
        self.at_bats += other.at_bats;
        self.runs += other.runs;
        self.hits += other.hits;
        self.doubles += other.doubles;
        self.triples += other.triples;
        self.home_runs += other.home_runs;
        self.rbi += other.rbi;
        self.stolen_bases += other.stolen_bases;
        self.caught_stealing += other.caught_stealing;
        self.base_on_balls += other.base_on_balls;
        self.intentional_walks += other.intentional_walks;
        self.strike_outs += other.strike_outs;
        self.hit_by_pitch += other.hit_by_pitch;
        self.sac_flies += other.sac_flies;
    }

    fn singles(&self) -> i64 {
        self.hits - self.doubles - self.triples - self.home_runs
    }

    fn total_bases(&self) -> i64 {
        self.singles() + 2 * self.doubles + 3 * self.triples + 4 * self.home_runs
    }

    pub fn batting_avg(&self) -> Option<f64> {
        ratio(self.hits as f64, self.at_bats)
    }

    pub fn on_base_pct(&self) -> Option<f64> {
        ratio(
            (self.hits + self.base_on_balls + self.hit_by_pitch) as f64,
            self.at_bats + self.base_on_balls + self.hit_by_pitch + self.sac_flies,
        )
    }

    pub fn slugging_pct(&self) -> Option<f64> {
        ratio(self.total_bases() as f64, self.at_bats)
    }

    pub fn ops(&self) -> Option<f64> {
        Some(self.on_base_pct()? + self.slugging_pct()?)
    }

    pub fn woba(&self) -> Option<f64> {
        let unintentional_walks = self.base_on_balls - self.intentional_walks;
        let numerator = WOBA_UNINTENTIONAL_WALK * unintentional_walks as f64
            + WOBA_HIT_BY_PITCH * self.hit_by_pitch as f64
            + WOBA_SINGLE * self.singles() as f64
            + WOBA_DOUBLE * self.doubles as f64
            + WOBA_TRIPLE * self.triples as f64
            + WOBA_HOME_RUN * self.home_runs as f64;
        ratio(
            numerator,
            self.at_bats + unintentional_walks + self.sac_flies + self.hit_by_pitch,
        )
    }

    pub fn to_hitting_line(
        &self,
        date: NaiveDate,
        player_id: i64,
        player_name: &str,
        team: Option<&str>,
    ) -> HittingLine {
        HittingLine {
            date,
            player_id: Some(player_id.to_string()),
            player_name: player_name.to_string(),
            team: team.map(str::to_string),
            games: Some(self.games_played),
            plate_appearances: Some(self.plate_appearances),
            at_bats: Some(self.at_bats),
            runs: Some(self.runs),
            hits: Some(self.hits),
            doubles: Some(self.doubles),
            triples: Some(self.triples),
            home_runs: Some(self.home_runs),
            rbi: Some(self.rbi),
            stolen_bases: Some(self.stolen_bases),
            caught_stealing: Some(self.caught_stealing),
            walks: Some(self.base_on_balls),
            strikeouts: Some(self.strike_outs),
            batting_avg: self.batting_avg(),
            on_base_pct: self.on_base_pct(),
            slugging_pct: self.slugging_pct(),
            ops: self.ops(),
            woba: self.woba(),
            wrc_plus: None,
            war: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PitchingCounts {
    pub games_played: i64,
    pub games_started: i64,
    /// Baseball notation, "6.1" meaning six and one third.
    pub innings_pitched: Option<String>,
    pub outs: Option<i64>,
    pub batters_faced: i64,
    pub hits: i64,
    pub runs: i64,
    pub earned_runs: i64,
    pub home_runs: i64,
    pub base_on_balls: i64,
    pub hit_by_pitch: i64,
    pub strike_outs: i64,
    pub saves: i64,
    pub holds: i64,
}

/// Converts "6.1" innings notation to recorded outs (19).
pub fn outs_from_innings_notation(notation: &str) -> Option<i64> {
    let (whole, partial) = match notation.trim().split_once('.') {
        Some((whole, partial)) => (whole, partial),
        None => (notation.trim(), "0"),
    };
    let whole: i64 = whole.parse().ok()?;
    let partial: i64 = partial.parse().ok()?;
    if !(0..=2).contains(&partial) {
        return None;
    }
    Some(whole * 3 + partial)
}

impl PitchingCounts {
    pub fn total_outs(&self) -> i64 {
        self.outs
            .or_else(|| {
                self.innings_pitched
                    .as_deref()
                    .and_then(outs_from_innings_notation)
            })
            .unwrap_or(0)
    }

    pub fn has_appearance(&self) -> bool {
        self.batters_faced > 0 || self.total_outs() > 0
    }

    pub fn merge(&mut self, other: &PitchingCounts) {
        self.outs = Some(self.total_outs() + other.total_outs());
        self.innings_pitched = None;
        self.games_played += other.games_played;
        self.games_started += other.games_started;
        self.batters_faced += other.batters_faced;
        self.hits += other.hits;
        self.runs += other.runs;
        self.earned_runs += other.earned_runs;
        self.home_runs += other.home_runs;
        self.base_on_balls += other.base_on_balls;
        self.hit_by_pitch += other.hit_by_pitch;
        self.strike_outs += other.strike_outs;
        self.saves += other.saves;
        self.holds += other.holds;
    }

    pub fn innings(&self) -> f64 {
        self.total_outs() as f64 / 3.0
    }

    fn per_inning(&self, value: f64) -> Option<f64> {
        let innings = self.innings();
        if innings > 0.0 {
            Some(value / innings)
        } else {
            None
        }
    }

    pub fn era(&self) -> Option<f64> {
        self.per_inning(9.0 * self.earned_runs as f64)
    }

    pub fn whip(&self) -> Option<f64> {
        self.per_inning((self.base_on_balls + self.hits) as f64)
    }

    pub fn fip(&self) -> Option<f64> {
        let raw = 13 * self.home_runs + 3 * (self.base_on_balls + self.hit_by_pitch)
            - 2 * self.strike_outs;
        self.per_inning(raw as f64).map(|v| v + FIP_CONSTANT)
    }

    pub fn to_pitching_line(
        &self,
        date: NaiveDate,
        player_id: i64,
        player_name: &str,
        team: Option<&str>,
    ) -> PitchingLine {
        PitchingLine {
            date,
            player_id: Some(player_id.to_string()),
            player_name: player_name.to_string(),
            team: team.map(str::to_string),
            games: Some(self.games_played),
            games_started: Some(self.games_started),
            innings_pitched: Some(self.innings()),
            hits_allowed: Some(self.hits),
            runs_allowed: Some(self.runs),
            earned_runs: Some(self.earned_runs),
            home_runs_allowed: Some(self.home_runs),
            walks_allowed: Some(self.base_on_balls),
            strikeouts: Some(self.strike_outs),
            era: self.era(),
            whip: self.whip(),
            fip: self.fip(),
            xfip: None,
            war: None,
            saves: Some(self.saves),
            holds: Some(self.holds),
        }
    }
}

fn ratio(numerator: f64, denominator: i64) -> Option<f64> {
    if denominator > 0 {
        Some(numerator / denominator as f64)
    } else {
        None
    }
}
