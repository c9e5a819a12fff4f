//! Stats API schedule and live game feed payloads, and their projection onto
//! pitch events and per-player daily lines.

use super::stats::{BattingCounts, PitchingCounts};
use crate::store::{is_barrel, parse_date, PitchEvent};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;

const INCHES_PER_FOOT: f64 = 12.0;

// =============================================================================
// Schedule
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct ScheduleResponse {
    #[serde(default)]
    pub dates: Vec<ScheduleDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScheduleDate {
    #[serde(default)]
    pub games: Vec<ScheduleGame>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScheduleGame {
    pub game_pk: i64,
    #[serde(default)]
    pub status: GameStatus,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct GameStatus {
    pub abstract_game_state: String,
    pub coded_game_state: String,
}

impl GameStatus {
    /// Completed games only. Postponed and cancelled games are also
    /// "Final" in the abstract state but carry their own codes.
    pub fn is_final(&self) -> bool {
        self.abstract_game_state == "Final"
            && matches!(self.coded_game_state.as_str(), "F" | "O")
    }
}

impl ScheduleResponse {
    pub fn final_game_pks(&self) -> Vec<i64> {
        self.dates
            .iter()
            .flat_map(|d| d.games.iter())
            .filter(|g| g.status.is_final())
            .map(|g| g.game_pk)
            .collect()
    }
}

// =============================================================================
// Live feed
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GameFeed {
    pub game_pk: i64,
    pub game_data: GameData,
    pub live_data: LiveData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GameData {
    #[serde(default)]
    pub datetime: GameDateTime,
    #[serde(default)]
    pub status: GameStatus,
    pub teams: GameTeams,
    #[serde(default)]
    pub players: HashMap<String, FeedPerson>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct GameDateTime {
    pub official_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GameTeams {
    pub away: FeedTeam,
    pub home: FeedTeam,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeedTeam {
    pub abbreviation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FeedPerson {
    pub full_name: Option<String>,
    pub last_first_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LiveData {
    #[serde(default)]
    pub plays: Plays,
    #[serde(default)]
    pub boxscore: Boxscore,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct Plays {
    pub all_plays: Vec<Play>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Play {
    #[serde(default)]
    pub result: PlayResult,
    #[serde(default)]
    pub about: PlayAbout,
    pub matchup: Matchup,
    #[serde(default)]
    pub play_events: Vec<PlayEvent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct PlayResult {
    pub event_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct PlayAbout {
    pub is_complete: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Matchup {
    pub batter: PersonRef,
    pub pitcher: PersonRef,
    pub bat_side: Option<Code>,
    pub pitch_hand: Option<Code>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PersonRef {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Code {
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlayEvent {
    #[serde(default)]
    pub is_pitch: bool,
    #[serde(default)]
    pub details: EventDetails,
    pub count: Option<Count>,
    pub pitch_data: Option<PitchData>,
    pub hit_data: Option<HitData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct EventDetails {
    pub call: Option<Code>,
    pub code: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub pitch_type: Option<Code>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Count {
    pub balls: i64,
    pub strikes: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct PitchData {
    pub start_speed: Option<f64>,
    pub strike_zone_top: Option<f64>,
    pub strike_zone_bottom: Option<f64>,
    pub extension: Option<f64>,
    pub zone: Option<i64>,
    pub coordinates: PitchCoordinates,
    pub breaks: PitchBreaks,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct PitchCoordinates {
    #[serde(rename = "pfxX")]
    pub pfx_x: Option<f64>,
    #[serde(rename = "pfxZ")]
    pub pfx_z: Option<f64>,
    #[serde(rename = "pX")]
    pub p_x: Option<f64>,
    #[serde(rename = "pZ")]
    pub p_z: Option<f64>,
    #[serde(rename = "vX0")]
    pub vx0: Option<f64>,
    #[serde(rename = "vY0")]
    pub vy0: Option<f64>,
    #[serde(rename = "vZ0")]
    pub vz0: Option<f64>,
    #[serde(rename = "aX")]
    pub ax: Option<f64>,
    #[serde(rename = "aY")]
    pub ay: Option<f64>,
    #[serde(rename = "aZ")]
    pub az: Option<f64>,
    pub x0: Option<f64>,
    pub y0: Option<f64>,
    pub z0: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct PitchBreaks {
    pub spin_rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct HitData {
    pub launch_speed: Option<f64>,
    pub launch_angle: Option<f64>,
    pub total_distance: Option<f64>,
    pub trajectory: Option<String>,
    pub location: Option<String>,
    pub coordinates: HitCoordinates,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct HitCoordinates {
    pub coord_x: Option<f64>,
    pub coord_y: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Boxscore {
    pub teams: Option<BoxscoreTeams>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BoxscoreTeams {
    pub away: BoxscoreTeam,
    pub home: BoxscoreTeam,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct BoxscoreTeam {
    pub players: HashMap<String, BoxscorePlayer>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BoxscorePlayer {
    pub person: PersonRef,
    #[serde(default)]
    pub stats: BoxscoreStats,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct BoxscoreStats {
    pub batting: BattingCounts,
    pub pitching: PitchingCounts,
}

// =============================================================================
// Normalization
// =============================================================================

/// Pitch call code to the pitch-level `description` vocabulary.
pub fn describe_call(code: &str) -> Option<&'static str> {
    let description = match code {
        "B" => "ball",
        "*B" => "blocked_ball",
        "I" => "intent_ball",
        "P" | "V" => "pitchout",
        "C" => "called_strike",
        "S" => "swinging_strike",
        "W" => "swinging_strike_blocked",
        "F" => "foul",
        "T" => "foul_tip",
        "L" => "foul_bunt",
        "M" => "missed_bunt",
        "O" => "bunt_foul_tip",
        "H" => "hit_by_pitch",
        "X" | "D" | "E" => "hit_into_play",
        _ => return None,
    };
    Some(description)
}

/// Ball, strike or in play.
pub fn pitch_result_type(code: &str) -> Option<&'static str> {
    match code {
        "B" | "*B" | "I" | "P" | "V" | "H" => Some("B"),
        "C" | "S" | "W" | "F" | "T" | "L" | "M" | "O" | "Q" | "R" | "K" => Some("S"),
        "X" | "D" | "E" => Some("X"),
        _ => None,
    }
}

fn snake_case(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Bunt trajectories fold into their batted-ball class.
fn batted_ball_type(trajectory: &str) -> String {
    match trajectory {
        "bunt_grounder" => "ground_ball".to_string(),
        "bunt_popup" => "popup".to_string(),
        "bunt_line_drive" => "line_drive".to_string(),
        other => other.to_string(),
    }
}

/// The player-level output of one final game.
#[derive(Debug, Default)]
pub(crate) struct GameRecords {
    pub pitch_events: Vec<PitchEvent>,
    /// (player id, team abbreviation, counts)
    pub batting: Vec<(i64, Option<String>, BattingCounts)>,
    pub pitching: Vec<(i64, Option<String>, PitchingCounts)>,
}

impl GameFeed {
    pub fn is_final(&self) -> bool {
        self.game_data.status.is_final()
    }

    pub fn person(&self, id: i64) -> Option<&FeedPerson> {
        self.game_data.players.get(&format!("ID{}", id))
    }

    /// "Last, First" name of a player appearing in this game.
    pub fn player_name(&self, id: i64) -> Option<String> {
        self.person(id).and_then(|p| {
            p.last_first_name
                .clone()
                .or_else(|| p.full_name.as_deref().map(crate::players::to_last_first))
        })
    }

    pub fn game_date(&self) -> Option<NaiveDate> {
        self.game_data
            .datetime
            .official_date
            .as_deref()
            .and_then(parse_date)
    }

    pub fn into_records(self, date: NaiveDate) -> GameRecords {
        let pitch_events = self.pitch_events(date);

        let away_team = self.game_data.teams.away.abbreviation.clone();
        let home_team = self.game_data.teams.home.abbreviation.clone();
        let mut records = GameRecords {
            pitch_events,
            ..Default::default()
        };

        if let Some(teams) = self.live_data.boxscore.teams {
            for (side, team) in [(teams.away, away_team), (teams.home, home_team)] {
                for player in side.players.into_values() {
                    let id = player.person.id;
                    if player.stats.batting.has_appearance() {
                        records
                            .batting
                            .push((id, team.clone(), player.stats.batting));
                    }
                    if player.stats.pitching.has_appearance() {
                        records
                            .pitching
                            .push((id, team.clone(), player.stats.pitching));
                    }
                }
            }
        }
        records
    }

    /// Every pitch of the game, with the count as it stood before the pitch.
    pub fn pitch_events(&self, date: NaiveDate) -> Vec<PitchEvent> {
        let home_team = self.game_data.teams.home.abbreviation.clone();
        let away_team = self.game_data.teams.away.abbreviation.clone();
        let game_date = self.game_date().or(Some(date));
        let mut events = Vec::new();

        for play in &self.live_data.plays.all_plays {
            let pitcher_id = play.matchup.pitcher.id;
            let batter_id = play.matchup.batter.id;
            let pitcher_name = self.player_name(pitcher_id);
            let stand = play.matchup.bat_side.as_ref().and_then(|c| c.code.clone());
            let p_throws = play.matchup.pitch_hand.as_ref().and_then(|c| c.code.clone());

            let last_pitch = play.play_events.iter().rposition(|e| e.is_pitch);
            let mut count = Count::default();

            for (index, play_event) in play.play_events.iter().enumerate() {
                let count_before = count;
                if let Some(after) = play_event.count {
                    count = after;
                }
                if !play_event.is_pitch {
                    continue;
                }

                let details = &play_event.details;
                let call_code = details
                    .call
                    .as_ref()
                    .and_then(|c| c.code.clone())
                    .or_else(|| details.code.clone());
                let description = call_code
                    .as_deref()
                    .and_then(describe_call)
                    .map(str::to_string)
                    .or_else(|| details.description.as_deref().map(snake_case));
                let pitch_data = play_event.pitch_data.as_ref();
                let coordinates = pitch_data.map(|p| &p.coordinates);
                let hit_data = play_event.hit_data.as_ref();

                let is_final_pitch = play.about.is_complete && Some(index) == last_pitch;

                let event = PitchEvent {
                    date,
                    player_id: Some(pitcher_id.to_string()),
                    player_name: pitcher_name.clone(),
                    pitch_type: details.pitch_type.as_ref().and_then(|t| t.code.clone()),
                    game_date,
                    release_speed: pitch_data.and_then(|p| p.start_speed),
                    // x0/z0 are measured 50 ft from the plate
                    release_pos_x: coordinates.and_then(|c| c.x0),
                    release_pos_y: coordinates.and_then(|c| c.y0),
                    release_pos_z: coordinates.and_then(|c| c.z0),
                    batter: Some(batter_id.to_string()),
                    pitcher: Some(pitcher_id.to_string()),
                    events: if is_final_pitch {
                        play.result.event_type.clone()
                    } else {
                        None
                    },
                    description,
                    zone: pitch_data.and_then(|p| p.zone),
                    stand: stand.clone(),
                    p_throws: p_throws.clone(),
                    home_team: home_team.clone(),
                    away_team: away_team.clone(),
                    pitch_result_type: call_code
                        .as_deref()
                        .and_then(pitch_result_type)
                        .map(str::to_string),
                    hit_location: hit_data
                        .and_then(|h| h.location.as_deref())
                        .and_then(|l| l.parse().ok()),
                    bb_type: hit_data
                        .and_then(|h| h.trajectory.as_deref())
                        .map(batted_ball_type),
                    balls: Some(count_before.balls),
                    strikes: Some(count_before.strikes),
                    pfx_x: coordinates.and_then(|c| c.pfx_x).map(|v| v / INCHES_PER_FOOT),
                    pfx_z: coordinates.and_then(|c| c.pfx_z).map(|v| v / INCHES_PER_FOOT),
                    plate_x: coordinates.and_then(|c| c.p_x),
                    plate_z: coordinates.and_then(|c| c.p_z),
                    vx0: coordinates.and_then(|c| c.vx0),
                    vy0: coordinates.and_then(|c| c.vy0),
                    vz0: coordinates.and_then(|c| c.vz0),
                    ax: coordinates.and_then(|c| c.ax),
                    ay: coordinates.and_then(|c| c.ay),
                    az: coordinates.and_then(|c| c.az),
                    sz_top: pitch_data.and_then(|p| p.strike_zone_top),
                    sz_bot: pitch_data.and_then(|p| p.strike_zone_bottom),
                    hit_distance_sc: hit_data.and_then(|h| h.total_distance),
                    launch_speed: hit_data.and_then(|h| h.launch_speed),
                    launch_angle: hit_data.and_then(|h| h.launch_angle),
                    effective_speed: None,
                    release_spin_rate: pitch_data.and_then(|p| p.breaks.spin_rate),
                    release_extension: pitch_data.and_then(|p| p.extension),
                    game_pk: Some(self.game_pk),
                    pitcher_id: Some(pitcher_id),
                    batter_id: Some(batter_id),
                    hc_x: hit_data.and_then(|h| h.coordinates.coord_x),
                    hc_y: hit_data.and_then(|h| h.coordinates.coord_y),
                    barrel: false,
                };
                events.push(PitchEvent {
                    barrel: is_barrel(event.launch_speed, event.launch_angle),
                    ..event
                });
            }
        }
        events
    }
}
