//! Blocking client for the public MLB Stats API.
//!
//! A day is fetched as the schedule for that date followed by the live feed
//! of every final game on it. Requests are spaced by a minimum interval.

use super::feed::{GameFeed, ScheduleResponse};
use super::stats::{BattingCounts, PitchingCounts};
use super::{PlayerEntry, PlayerRegistry, ProviderError, StatsSource};
use crate::players::to_last_first;
use crate::store::{format_date, DayBatch, HittingLine, PitchingLine};
use chrono::{Datelike, Local, NaiveDate};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(250);
const SEASON_STATS_LIMIT: usize = 5000;

pub struct StatsApiClient {
    client: Client,
    base_url: String,
    last_request: Mutex<Instant>,
}

#[derive(Deserialize)]
struct SeasonStatsResponse {
    #[serde(default)]
    stats: Vec<SeasonStatsGroup>,
}

#[derive(Deserialize)]
struct SeasonStatsGroup {
    #[serde(default)]
    splits: Vec<SeasonSplit<serde_json::Value>>,
}

#[derive(Deserialize)]
struct SeasonSplit<T> {
    player: SplitPlayer,
    team: Option<SplitTeam>,
    stat: T,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SplitPlayer {
    id: i64,
    full_name: String,
}

#[derive(Deserialize)]
struct SplitTeam {
    abbreviation: Option<String>,
    name: Option<String>,
}

impl SplitTeam {
    fn label(&self) -> Option<&str> {
        self.abbreviation.as_deref().or(self.name.as_deref())
    }
}

#[derive(Deserialize)]
struct PeopleResponse {
    #[serde(default)]
    people: Vec<Person>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Person {
    id: i64,
    full_name: String,
    last_first_name: Option<String>,
}

/// Per-player counting stats summed across the games of one day.
struct DailyTotals<C> {
    name: String,
    team: Option<String>,
    counts: C,
}

impl StatsApiClient {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            last_request: Mutex::new(
                Instant::now()
                    .checked_sub(MIN_REQUEST_INTERVAL)
                    .unwrap_or_else(Instant::now),
            ),
        })
    }

    fn rate_limit(&self) {
        let mut last = self.last_request.lock().unwrap();
        let elapsed = last.elapsed();
        if elapsed < MIN_REQUEST_INTERVAL {
            std::thread::sleep(MIN_REQUEST_INTERVAL - elapsed);
        }
        *last = Instant::now();
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProviderError> {
        self.rate_limit();

        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);
        let response = self.client.get(&url).send()?;

        if !response.status().is_success() {
            return Err(ProviderError::Status {
                status: response.status().as_u16(),
                url,
            });
        }

        let body = response.text()?;
        serde_json::from_str(&body).map_err(|e| ProviderError::Decode {
            url,
            message: e.to_string(),
        })
    }

    fn final_games_on(&self, date: NaiveDate) -> Result<Vec<i64>, ProviderError> {
        let schedule: ScheduleResponse = self.get_json(&format!(
            "/api/v1/schedule?sportId=1&date={}",
            format_date(date)
        ))?;
        Ok(schedule.final_game_pks())
    }

    fn game_feed(&self, game_pk: i64) -> Result<GameFeed, ProviderError> {
        self.get_json(&format!("/api/v1.1/game/{}/feed/live", game_pk))
    }

    fn season_splits<T: DeserializeOwned>(
        &self,
        group: &str,
        season: i32,
    ) -> Result<Vec<SeasonSplit<T>>, ProviderError> {
        let path = format!(
            "/api/v1/stats?stats=season&group={}&season={}&sportId=1&playerPool=All&limit={}",
            group, season, SEASON_STATS_LIMIT
        );
        let response: SeasonStatsResponse = self.get_json(&path)?;

        let mut splits = Vec::new();
        for split in response.stats.into_iter().flat_map(|g| g.splits) {
            match serde_json::from_value::<T>(split.stat) {
                Ok(stat) => splits.push(SeasonSplit {
                    player: split.player,
                    team: split.team,
                    stat,
                }),
                Err(err) => {
                    return Err(ProviderError::Decode {
                        url: format!("{}{}", self.base_url, path),
                        message: err.to_string(),
                    })
                }
            }
        }
        Ok(splits)
    }
}

impl StatsSource for StatsApiClient {
    fn fetch_day(&self, date: NaiveDate) -> Result<DayBatch, ProviderError> {
        let game_pks = self.final_games_on(date)?;
        if game_pks.is_empty() {
            info!("No final games on {}", format_date(date));
            return Ok(DayBatch::default());
        }

        let mut batch = DayBatch::default();
        let mut batting: BTreeMap<i64, DailyTotals<BattingCounts>> = BTreeMap::new();
        let mut pitching: BTreeMap<i64, DailyTotals<PitchingCounts>> = BTreeMap::new();

        for game_pk in game_pks {
            let feed = self.game_feed(game_pk)?;
            if !feed.is_final() {
                warn!("Game {} is no longer final, skipping", game_pk);
                continue;
            }

            let names: BTreeMap<i64, String> = feed
                .live_data
                .boxscore
                .teams
                .iter()
                .flat_map(|t| t.away.players.values().chain(t.home.players.values()))
                .filter_map(|p| feed.player_name(p.person.id).map(|n| (p.person.id, n)))
                .collect();

            let records = feed.into_records(date);
            debug!(
                "Game {}: {} pitches, {} batters, {} pitchers",
                game_pk,
                records.pitch_events.len(),
                records.batting.len(),
                records.pitching.len()
            );
            batch.pitch_events.extend(records.pitch_events);

            for (id, team, counts) in records.batting {
                let Some(name) = names.get(&id) else { continue };
                batting
                    .entry(id)
                    .and_modify(|t| t.counts.merge(&counts))
                    .or_insert(DailyTotals {
                        name: name.clone(),
                        team,
                        counts,
                    });
            }
            for (id, team, counts) in records.pitching {
                let Some(name) = names.get(&id) else { continue };
                pitching
                    .entry(id)
                    .and_modify(|t| t.counts.merge(&counts))
                    .or_insert(DailyTotals {
                        name: name.clone(),
                        team,
                        counts,
                    });
            }
        }

        batch.hitting = batting
            .into_iter()
            .map(|(id, t)| {
                t.counts
                    .to_hitting_line(date, id, &t.name, t.team.as_deref())
            })
            .collect();
        batch.pitching = pitching
            .into_iter()
            .map(|(id, t)| {
                t.counts
                    .to_pitching_line(date, id, &t.name, t.team.as_deref())
            })
            .collect();

        info!(
            "Fetched {} pitches, {} hitting lines and {} pitching lines for {}",
            batch.pitch_events.len(),
            batch.hitting.len(),
            batch.pitching.len(),
            format_date(date)
        );
        Ok(batch)
    }

    fn season_hitting(&self, as_of: NaiveDate) -> Result<Vec<HittingLine>, ProviderError> {
        let splits = self.season_splits::<BattingCounts>("hitting", as_of.year())?;
        Ok(splits
            .into_iter()
            .filter(|s| s.stat.has_appearance())
            .map(|s| {
                s.stat.to_hitting_line(
                    as_of,
                    s.player.id,
                    &to_last_first(&s.player.full_name),
                    s.team.as_ref().and_then(SplitTeam::label),
                )
            })
            .collect())
    }

    fn season_pitching(&self, as_of: NaiveDate) -> Result<Vec<PitchingLine>, ProviderError> {
        let splits = self.season_splits::<PitchingCounts>("pitching", as_of.year())?;
        Ok(splits
            .into_iter()
            .filter(|s| s.stat.has_appearance())
            .map(|s| {
                s.stat.to_pitching_line(
                    as_of,
                    s.player.id,
                    &to_last_first(&s.player.full_name),
                    s.team.as_ref().and_then(SplitTeam::label),
                )
            })
            .collect())
    }
}

impl PlayerRegistry for StatsApiClient {
    fn load_players(&self) -> Result<Vec<PlayerEntry>, ProviderError> {
        let season = Local::now().year();
        let response: PeopleResponse =
            self.get_json(&format!("/api/v1/sports/1/players?season={}", season))?;
        Ok(response
            .people
            .into_iter()
            .map(|p| PlayerEntry {
                id: p.id,
                last_first_name: p
                    .last_first_name
                    .unwrap_or_else(|| to_last_first(&p.full_name)),
                full_name: p.full_name,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_split_decoding() {
        let response: SeasonStatsResponse = serde_json::from_value(serde_json::json!({
            "stats": [{"splits": [
                {"player": {"id": 592450, "fullName": "Aaron Judge"},
                 "team": {"id": 147, "name": "New York Yankees"},
                 "stat": {"gamesPlayed": 60, "atBats": 220, "hits": 80, "homeRuns": 25,
                          "plateAppearances": 260, "avg": ".364"}}
            ]}]
        }))
        .unwrap();
        let split = response.stats.into_iter().flat_map(|g| g.splits).next().unwrap();
        let counts: BattingCounts = serde_json::from_value(split.stat).unwrap();
        assert_eq!(counts.home_runs, 25);
        assert_eq!(
            split.team.as_ref().and_then(SplitTeam::label),
            Some("New York Yankees")
        );
    }

    #[test]
    fn test_people_decoding() {
        let response: PeopleResponse = serde_json::from_value(serde_json::json!({
            "people": [
                {"id": 592450, "fullName": "Aaron Judge", "lastFirstName": "Judge, Aaron"},
                {"id": 1, "fullName": "Elly De La Cruz"}
            ]
        }))
        .unwrap();
        assert_eq!(response.people.len(), 2);
        assert_eq!(response.people[1].last_first_name, None);
    }

    #[test]
    fn test_client_trims_base_url() {
        let client =
            StatsApiClient::new("https://statsapi.mlb.com/", "test-agent", Duration::from_secs(5))
                .unwrap();
        assert_eq!(client.base_url, "https://statsapi.mlb.com");
    }

    #[test]
    fn test_unreachable_host_is_http_error() {
        let client = StatsApiClient::new("http://127.0.0.1:9", "test-agent", Duration::from_secs(2))
            .unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert!(matches!(client.fetch_day(date), Err(ProviderError::Http(_))));
    }

    #[cfg(feature = "live-api")]
    #[test]
    fn test_live_fetch_day() {
        let client = StatsApiClient::new(
            super::super::DEFAULT_STATS_API_BASE_URL,
            "mlb-daily-stats-tests",
            Duration::from_secs(30),
        )
        .unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let batch = client.fetch_day(date).unwrap();
        assert!(!batch.pitch_events.is_empty());
        assert!(batch.pitch_events.iter().all(|e| e.date == date));
    }
}
