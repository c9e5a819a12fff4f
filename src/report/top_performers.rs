use crate::store::{HittingLine, PitchingLine};
use serde::Serialize;

/// Minimum innings for the ERA leader.
pub const QUALIFYING_INNINGS: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HitterLeader {
    pub name: String,
    pub team: Option<String>,
    pub ops: f64,
    pub avg: f64,
    pub home_runs: i64,
    pub rbi: i64,
}

impl HitterLeader {
    fn from_line(line: &HittingLine) -> Self {
        Self {
            name: line.player_name.clone(),
            team: line.team.clone(),
            ops: line.ops.unwrap_or_default(),
            avg: line.batting_avg.unwrap_or_default(),
            home_runs: line.home_runs.unwrap_or_default(),
            rbi: line.rbi.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PitcherLeader {
    pub name: String,
    pub team: Option<String>,
    pub era: f64,
    pub whip: f64,
    pub strikeouts: i64,
    pub innings: f64,
}

impl PitcherLeader {
    fn from_line(line: &PitchingLine) -> Self {
        Self {
            name: line.player_name.clone(),
            team: line.team.clone(),
            era: line.era.unwrap_or_default(),
            whip: line.whip.unwrap_or_default(),
            strikeouts: line.strikeouts.unwrap_or_default(),
            innings: line.innings_pitched.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TopPerformers {
    pub best_ops: Option<HitterLeader>,
    pub home_run_leader: Option<HitterLeader>,
    pub best_era: Option<PitcherLeader>,
    pub strikeout_leader: Option<PitcherLeader>,
}

/// First item with the strictly greatest key. Items without a key are skipped.
fn first_max<'a, T, K: PartialOrd>(
    items: &'a [T],
    key: impl Fn(&T) -> Option<K>,
) -> Option<&'a T> {
    let mut best: Option<(&T, K)> = None;
    for item in items {
        let Some(k) = key(item) else { continue };
        let better = best.as_ref().map_or(true, |(_, current)| k > *current);
        if better {
            best = Some((item, k));
        }
    }
    best.map(|(item, _)| item)
}

impl TopPerformers {
    pub fn identify(hitting: &[HittingLine], pitching: &[PitchingLine]) -> Self {
        let qualified: Vec<PitchingLine> = pitching
            .iter()
            .filter(|p| p.innings_pitched.is_some_and(|ip| ip >= QUALIFYING_INNINGS))
            .cloned()
            .collect();

        TopPerformers {
            best_ops: first_max(hitting, |h| h.ops).map(HitterLeader::from_line),
            home_run_leader: first_max(hitting, |h| h.home_runs).map(HitterLeader::from_line),
            best_era: first_max(&qualified, |p| p.era.map(|era| -era))
                .map(PitcherLeader::from_line),
            strikeout_leader: first_max(pitching, |p| p.strikeouts)
                .map(PitcherLeader::from_line),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.best_ops.is_none()
            && self.home_run_leader.is_none()
            && self.best_era.is_none()
            && self.strikeout_leader.is_none()
    }
}
