use super::models::{
    format_date, DayBatch, DayWriteSummary, HittingLine, LeagueAverages, LedgerStatus,
    PitchEvent, PitchEventPlayer, PitchingLine, RetentionCounts, StoreSummary,
    UpdateLedgerEntry, DATE_FORMAT,
};
use super::schema::{DATED_TABLES, STATS_VERSIONED_SCHEMAS};
use super::{DateRange, StatsStore};
use crate::players::PlayerIdentity;
use crate::sqlite_persistence::{VersionedSchema, BASE_DB_VERSION};
use anyhow::{ensure, Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, warn};

const INSERT_PITCH_EVENT_SQL: &str = "INSERT OR IGNORE INTO statcast_data (
    date, player_id, player_name, pitch_type, game_date,
    release_speed, release_pos_x, release_pos_y, release_pos_z,
    batter, pitcher, events, description, zone, stand, p_throws,
    home_team, away_team, type, hit_location, bb_type, balls, strikes,
    pfx_x, pfx_z, plate_x, plate_z, vx0, vy0, vz0, ax, ay, az,
    sz_top, sz_bot, hit_distance_sc, launch_speed, launch_angle,
    effective_speed, release_spin_rate, release_extension,
    game_pk, pitcher_id, batter_id, hc_x, hc_y, barrel
) VALUES (
    ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
    ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30, ?31,
    ?32, ?33, ?34, ?35, ?36, ?37, ?38, ?39, ?40, ?41, ?42, ?43, ?44, ?45, ?46, ?47
)";

const INSERT_HITTING_SQL: &str = "INSERT OR IGNORE INTO daily_hitting (
    date, player_id, player_name, team, games, plate_appearances, at_bats,
    runs, hits, doubles, triples, home_runs, rbi, stolen_bases, caught_stealing,
    walks, strikeouts, batting_avg, on_base_pct, slugging_pct, ops, woba,
    wrc_plus, war
) VALUES (
    ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
    ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24
)";

const INSERT_PITCHING_SQL: &str = "INSERT OR IGNORE INTO daily_pitching (
    date, player_id, player_name, team, games, games_started, innings_pitched,
    hits_allowed, runs_allowed, earned_runs, home_runs_allowed, walks_allowed,
    strikeouts, era, whip, fip, xfip, war, saves, holds
) VALUES (
    ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
    ?17, ?18, ?19, ?20
)";

pub struct SqliteStatsStore {
    conn: Mutex<Connection>,
}

impl SqliteStatsStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open stats database at {:?}", path))?;
        info!("Opened stats database at {:?}", path);
        Self::from_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    fn latest_schema() -> &'static VersionedSchema {
        &STATS_VERSIONED_SCHEMAS[STATS_VERSIONED_SCHEMAS.len() - 1]
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        let table_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table'",
            [],
            |row| row.get(0),
        )?;

        if table_count == 0 {
            info!("Creating stats database schema");
            Self::latest_schema().create(&conn)?;
        } else {
            let raw_version: i64 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
            let db_version = raw_version - BASE_DB_VERSION as i64;

            if db_version < 1 {
                anyhow::bail!(
                    "Stats database version {} is invalid (expected >= 1)",
                    db_version
                );
            }

            let version_index = STATS_VERSIONED_SCHEMAS
                .iter()
                .position(|s| s.version == db_version as usize)
                .with_context(|| format!("Unknown stats database version {}", db_version))?;
            STATS_VERSIONED_SCHEMAS[version_index]
                .validate(&conn)
                .with_context(|| {
                    format!(
                        "Stats database schema validation failed for version {}",
                        db_version
                    )
                })?;

            let current_version = Self::latest_schema().version;
            if (db_version as usize) < current_version {
                info!(
                    "Migrating stats database from version {} to {}",
                    db_version, current_version
                );
                Self::migrate_if_needed(&mut conn, db_version as usize)?;
            }
        }

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn migrate_if_needed(conn: &mut Connection, from_version: usize) -> Result<()> {
        let tx = conn.transaction()?;
        let mut latest_from = from_version;
        for schema in STATS_VERSIONED_SCHEMAS.iter() {
            if schema.version > from_version {
                info!(
                    "Running stats database migration from version {} to {}",
                    latest_from, schema.version
                );
                if let Some(migration_fn) = schema.migration {
                    migration_fn(&tx).with_context(|| {
                        format!("Failed to run migration to version {}", schema.version)
                    })?;
                }
                latest_from = schema.version;
            }
        }
        tx.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + latest_from),
            [],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn date_column(row: &rusqlite::Row, name: &str) -> rusqlite::Result<NaiveDate> {
        let value: String = row.get(name)?;
        NaiveDate::parse_from_str(&value, DATE_FORMAT).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
    }

    fn row_to_hitting_line(row: &rusqlite::Row) -> rusqlite::Result<HittingLine> {
        Ok(HittingLine {
            date: Self::date_column(row, "date")?,
            player_id: row.get("player_id")?,
            player_name: row.get("player_name")?,
            team: row.get("team")?,
            games: row.get("games")?,
            plate_appearances: row.get("plate_appearances")?,
            at_bats: row.get("at_bats")?,
            runs: row.get("runs")?,
            hits: row.get("hits")?,
            doubles: row.get("doubles")?,
            triples: row.get("triples")?,
            home_runs: row.get("home_runs")?,
            rbi: row.get("rbi")?,
            stolen_bases: row.get("stolen_bases")?,
            caught_stealing: row.get("caught_stealing")?,
            walks: row.get("walks")?,
            strikeouts: row.get("strikeouts")?,
            batting_avg: row.get("batting_avg")?,
            on_base_pct: row.get("on_base_pct")?,
            slugging_pct: row.get("slugging_pct")?,
            ops: row.get("ops")?,
            woba: row.get("woba")?,
            wrc_plus: row.get("wrc_plus")?,
            war: row.get("war")?,
        })
    }

    fn row_to_pitching_line(row: &rusqlite::Row) -> rusqlite::Result<PitchingLine> {
        Ok(PitchingLine {
            date: Self::date_column(row, "date")?,
            player_id: row.get("player_id")?,
            player_name: row.get("player_name")?,
            team: row.get("team")?,
            games: row.get("games")?,
            games_started: row.get("games_started")?,
            innings_pitched: row.get("innings_pitched")?,
            hits_allowed: row.get("hits_allowed")?,
            runs_allowed: row.get("runs_allowed")?,
            earned_runs: row.get("earned_runs")?,
            home_runs_allowed: row.get("home_runs_allowed")?,
            walks_allowed: row.get("walks_allowed")?,
            strikeouts: row.get("strikeouts")?,
            era: row.get("era")?,
            whip: row.get("whip")?,
            fip: row.get("fip")?,
            xfip: row.get("xfip")?,
            war: row.get("war")?,
            saves: row.get("saves")?,
            holds: row.get("holds")?,
        })
    }

    fn row_to_pitch_event(row: &rusqlite::Row) -> rusqlite::Result<PitchEvent> {
        let game_date: Option<String> = row.get("game_date")?;
        let barrel: Option<i64> = row.get("barrel")?;

        Ok(PitchEvent {
            date: Self::date_column(row, "date")?,
            player_id: row.get("player_id")?,
            player_name: row.get("player_name")?,
            pitch_type: row.get("pitch_type")?,
            game_date: game_date
                .and_then(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).ok()),
            release_speed: row.get("release_speed")?,
            release_pos_x: row.get("release_pos_x")?,
            release_pos_y: row.get("release_pos_y")?,
            release_pos_z: row.get("release_pos_z")?,
            batter: row.get("batter")?,
            pitcher: row.get("pitcher")?,
            events: row.get("events")?,
            description: row.get("description")?,
            zone: row.get("zone")?,
            stand: row.get("stand")?,
            p_throws: row.get("p_throws")?,
            home_team: row.get("home_team")?,
            away_team: row.get("away_team")?,
            pitch_result_type: row.get("type")?,
            hit_location: row.get("hit_location")?,
            bb_type: row.get("bb_type")?,
            balls: row.get("balls")?,
            strikes: row.get("strikes")?,
            pfx_x: row.get("pfx_x")?,
            pfx_z: row.get("pfx_z")?,
            plate_x: row.get("plate_x")?,
            plate_z: row.get("plate_z")?,
            vx0: row.get("vx0")?,
            vy0: row.get("vy0")?,
            vz0: row.get("vz0")?,
            ax: row.get("ax")?,
            ay: row.get("ay")?,
            az: row.get("az")?,
            sz_top: row.get("sz_top")?,
            sz_bot: row.get("sz_bot")?,
            hit_distance_sc: row.get("hit_distance_sc")?,
            launch_speed: row.get("launch_speed")?,
            launch_angle: row.get("launch_angle")?,
            effective_speed: row.get("effective_speed")?,
            release_spin_rate: row.get("release_spin_rate")?,
            release_extension: row.get("release_extension")?,
            game_pk: row.get("game_pk")?,
            pitcher_id: row.get("pitcher_id")?,
            batter_id: row.get("batter_id")?,
            hc_x: row.get("hc_x")?,
            hc_y: row.get("hc_y")?,
            barrel: barrel.unwrap_or(0) != 0,
        })
    }

    fn row_to_ledger_entry(row: &rusqlite::Row) -> rusqlite::Result<UpdateLedgerEntry> {
        let status: Option<String> = row.get("status")?;
        let records_added: Option<i64> = row.get("records_added")?;
        Ok(UpdateLedgerEntry {
            update_date: Self::date_column(row, "update_date")?,
            data_date: Self::date_column(row, "data_date")?,
            records_added: records_added.unwrap_or(0),
            status: LedgerStatus::parse(status.as_deref().unwrap_or("")),
        })
    }

    fn insert_pitch_events(tx: &Transaction, events: &[PitchEvent]) -> Result<(usize, usize)> {
        let mut stmt = tx.prepare_cached(INSERT_PITCH_EVENT_SQL)?;
        let mut written = 0;
        let mut collided = 0;
        for e in events {
            let inserted = stmt.execute(params![
                format_date(e.date),
                e.player_id,
                e.player_name,
                e.pitch_type,
                e.game_date.map(format_date),
                e.release_speed,
                e.release_pos_x,
                e.release_pos_y,
                e.release_pos_z,
                e.batter,
                e.pitcher,
                e.events,
                e.description,
                e.zone,
                e.stand,
                e.p_throws,
                e.home_team,
                e.away_team,
                e.pitch_result_type,
                e.hit_location,
                e.bb_type,
                e.balls,
                e.strikes,
                e.pfx_x,
                e.pfx_z,
                e.plate_x,
                e.plate_z,
                e.vx0,
                e.vy0,
                e.vz0,
                e.ax,
                e.ay,
                e.az,
                e.sz_top,
                e.sz_bot,
                e.hit_distance_sc,
                e.launch_speed,
                e.launch_angle,
                e.effective_speed,
                e.release_spin_rate,
                e.release_extension,
                e.game_pk,
                e.pitcher_id,
                e.batter_id,
                e.hc_x,
                e.hc_y,
                e.barrel,
            ])?;
            if inserted == 0 {
                collided += 1;
            } else {
                written += 1;
            }
        }
        Ok((written, collided))
    }

    fn insert_hitting_lines(tx: &Transaction, lines: &[HittingLine]) -> Result<usize> {
        let mut stmt = tx.prepare_cached(INSERT_HITTING_SQL)?;
        let mut written = 0;
        for l in lines {
            written += stmt.execute(params![
                format_date(l.date),
                l.player_id,
                l.player_name,
                l.team,
                l.games,
                l.plate_appearances,
                l.at_bats,
                l.runs,
                l.hits,
                l.doubles,
                l.triples,
                l.home_runs,
                l.rbi,
                l.stolen_bases,
                l.caught_stealing,
                l.walks,
                l.strikeouts,
                l.batting_avg,
                l.on_base_pct,
                l.slugging_pct,
                l.ops,
                l.woba,
                l.wrc_plus,
                l.war,
            ])?;
        }
        Ok(written)
    }

    fn insert_pitching_lines(tx: &Transaction, lines: &[PitchingLine]) -> Result<usize> {
        let mut stmt = tx.prepare_cached(INSERT_PITCHING_SQL)?;
        let mut written = 0;
        for l in lines {
            written += stmt.execute(params![
                format_date(l.date),
                l.player_id,
                l.player_name,
                l.team,
                l.games,
                l.games_started,
                l.innings_pitched,
                l.hits_allowed,
                l.runs_allowed,
                l.earned_runs,
                l.home_runs_allowed,
                l.walks_allowed,
                l.strikeouts,
                l.era,
                l.whip,
                l.fip,
                l.xfip,
                l.war,
                l.saves,
                l.holds,
            ])?;
        }
        Ok(written)
    }

    fn delete_from_all(tx: &Transaction, filter: Option<&str>) -> Result<RetentionCounts> {
        let mut counts = RetentionCounts::default();
        for (table, date_column) in DATED_TABLES {
            let deleted = match filter {
                Some(cutoff) => tx.execute(
                    &format!("DELETE FROM {} WHERE {} < ?1", table, date_column),
                    params![cutoff],
                )?,
                None => tx.execute(&format!("DELETE FROM {}", table), [])?,
            };
            match *table {
                "daily_hitting" => counts.hitting = deleted,
                "daily_pitching" => counts.pitching = deleted,
                "statcast_data" => counts.pitch_events = deleted,
                _ => counts.ledger = deleted,
            }
        }
        Ok(counts)
    }
}

impl StatsStore for SqliteStatsStore {
    fn replace_day(&self, date: NaiveDate, batch: &DayBatch) -> Result<DayWriteSummary> {
        ensure!(
            batch.pitch_events.iter().all(|e| e.date == date)
                && batch.hitting.iter().all(|l| l.date == date)
                && batch.pitching.iter().all(|l| l.date == date),
            "Batch for {} contains rows dated on another day",
            date
        );

        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let date_str = format_date(date);

        let mut rows_replaced = 0;
        for table in ["statcast_data", "daily_hitting", "daily_pitching"] {
            rows_replaced += tx.execute(
                &format!("DELETE FROM {} WHERE date = ?1", table),
                params![date_str],
            )?;
        }

        let (pitch_events_written, pitch_events_collided) =
            Self::insert_pitch_events(&tx, &batch.pitch_events)?;
        let hitting_lines_written = Self::insert_hitting_lines(&tx, &batch.hitting)?;
        let pitching_lines_written = Self::insert_pitching_lines(&tx, &batch.pitching)?;

        tx.commit()
            .with_context(|| format!("Failed to commit day replacement for {}", date_str))?;

        if pitch_events_collided > 0 {
            warn!(
                "{} pitch events on {} shared a natural key with an earlier row and were dropped",
                pitch_events_collided, date_str
            );
        }
        debug!(
            "Replaced {} rows for {} with {} pitch events, {} hitting and {} pitching lines",
            rows_replaced,
            date_str,
            pitch_events_written,
            hitting_lines_written,
            pitching_lines_written
        );

        Ok(DayWriteSummary {
            pitch_events_written,
            pitch_events_collided,
            hitting_lines_written,
            pitching_lines_written,
            rows_replaced,
        })
    }

    fn record_update(&self, entry: &UpdateLedgerEntry) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO data_updates (update_date, data_date, records_added, status)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                format_date(entry.update_date),
                format_date(entry.data_date),
                entry.records_added,
                entry.status.to_string(),
            ],
        )?;
        Ok(())
    }

    fn remove_duplicate_pitch_events(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            "DELETE FROM statcast_data WHERE id NOT IN (
                SELECT MIN(id) FROM statcast_data
                GROUP BY date, game_pk, pitcher_id, batter_id, balls, strikes, pitch_type
            )",
            [],
        )?;
        Ok(deleted)
    }

    fn remove_older_than(&self, cutoff: NaiveDate) -> Result<RetentionCounts> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let counts = Self::delete_from_all(&tx, Some(format_date(cutoff).as_str()))?;
        tx.commit().context("Failed to commit retention sweep")?;
        Ok(counts)
    }

    fn clear_all(&self) -> Result<RetentionCounts> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let counts = Self::delete_from_all(&tx, None)?;
        tx.commit().context("Failed to commit database wipe")?;
        Ok(counts)
    }

    fn get_update(&self, data_date: NaiveDate) -> Result<Option<UpdateLedgerEntry>> {
        let conn = self.conn.lock().unwrap();
        let entry = conn
            .query_row(
                "SELECT update_date, data_date, records_added, status
                 FROM data_updates WHERE data_date = ?1",
                params![format_date(data_date)],
                Self::row_to_ledger_entry,
            )
            .optional()?;
        Ok(entry)
    }

    fn list_updates(&self) -> Result<Vec<UpdateLedgerEntry>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT update_date, data_date, records_added, status
             FROM data_updates ORDER BY data_date DESC",
        )?;
        let entries = stmt
            .query_map([], Self::row_to_ledger_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    fn count_pitch_events_on(&self, date: NaiveDate) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM statcast_data WHERE date = ?1",
            params![format_date(date)],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn hitting_lines_for(
        &self,
        player: &PlayerIdentity,
        range: DateRange,
    ) -> Result<Vec<HittingLine>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT * FROM daily_hitting
             WHERE (player_name = ?1 OR player_id = ?2)
               AND date BETWEEN ?3 AND ?4
             ORDER BY date DESC",
        )?;
        let lines = stmt
            .query_map(
                params![
                    player.name,
                    player.id_text(),
                    format_date(range.start),
                    format_date(range.end)
                ],
                Self::row_to_hitting_line,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(lines)
    }

    fn pitching_lines_for(
        &self,
        player: &PlayerIdentity,
        range: DateRange,
    ) -> Result<Vec<PitchingLine>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT * FROM daily_pitching
             WHERE (player_name = ?1 OR player_id = ?2)
               AND date BETWEEN ?3 AND ?4
             ORDER BY date DESC",
        )?;
        let lines = stmt
            .query_map(
                params![
                    player.name,
                    player.id_text(),
                    format_date(range.start),
                    format_date(range.end)
                ],
                Self::row_to_pitching_line,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(lines)
    }

    fn pitch_events_for(
        &self,
        player: &PlayerIdentity,
        range: DateRange,
    ) -> Result<Vec<PitchEvent>> {
        let conn = self.conn.lock().unwrap();
        // A NULL id makes both id comparisons NULL, leaving only the name match.
        let mut stmt = conn.prepare_cached(
            "SELECT * FROM statcast_data
             WHERE (pitcher_id = ?1 OR batter_id = ?1 OR player_name = ?2)
               AND date BETWEEN ?3 AND ?4
             ORDER BY date DESC, game_pk, id",
        )?;
        let events = stmt
            .query_map(
                params![
                    player.id,
                    player.name,
                    format_date(range.start),
                    format_date(range.end)
                ],
                Self::row_to_pitch_event,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(events)
    }

    fn league_averages(&self, date: NaiveDate) -> Result<LeagueAverages> {
        let conn = self.conn.lock().unwrap();
        let averages = conn.query_row(
            "SELECT
                AVG(batting_avg), AVG(on_base_pct), AVG(slugging_pct), AVG(ops),
                AVG(era), AVG(whip)
             FROM (
                SELECT batting_avg, on_base_pct, slugging_pct, ops, NULL AS era, NULL AS whip
                FROM daily_hitting WHERE date = ?1
                UNION ALL
                SELECT NULL, NULL, NULL, NULL, era, whip
                FROM daily_pitching WHERE date = ?1
             )",
            params![format_date(date)],
            |row| {
                Ok(LeagueAverages {
                    avg_batting_avg: row.get(0)?,
                    avg_obp: row.get(1)?,
                    avg_slg: row.get(2)?,
                    avg_ops: row.get(3)?,
                    avg_era: row.get(4)?,
                    avg_whip: row.get(5)?,
                })
            },
        )?;
        Ok(averages)
    }

    fn pitch_event_players(&self) -> Result<Vec<PitchEventPlayer>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT id, SUM(as_batter), SUM(as_pitcher) FROM (
                SELECT batter_id AS id, COUNT(*) AS as_batter, 0 AS as_pitcher
                FROM statcast_data WHERE batter_id IS NOT NULL GROUP BY batter_id
                UNION ALL
                SELECT pitcher_id AS id, 0 AS as_batter, COUNT(*) AS as_pitcher
                FROM statcast_data WHERE pitcher_id IS NOT NULL GROUP BY pitcher_id
             )
             GROUP BY id
             ORDER BY id",
        )?;
        let players = stmt
            .query_map([], |row| {
                Ok(PitchEventPlayer {
                    id: row.get(0)?,
                    as_batter: row.get::<_, i64>(1)? as usize,
                    as_pitcher: row.get::<_, i64>(2)? as usize,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(players)
    }

    fn pitcher_names_with_counts(&self) -> Result<Vec<(String, usize)>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT player_name, COUNT(*) FROM statcast_data
             WHERE player_name IS NOT NULL
             GROUP BY player_name
             ORDER BY player_name",
        )?;
        let names = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }

    fn summary(&self) -> Result<StoreSummary> {
        let conn = self.conn.lock().unwrap();
        let (oldest, newest, days, total) = conn.query_row(
            "SELECT MIN(date), MAX(date), COUNT(DISTINCT date), COUNT(*) FROM statcast_data",
            [],
            |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            },
        )?;
        Ok(StoreSummary {
            oldest_date: oldest.and_then(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).ok()),
            newest_date: newest.and_then(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).ok()),
            days_covered: days as usize,
            total_records: total as usize,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct TestStore {
        store: SqliteStatsStore,
        _temp_dir: TempDir, // Keep temp dir alive
    }

    fn create_test_store() -> TestStore {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("stats.db");
        let store = SqliteStatsStore::new(&db_path).unwrap();
        TestStore {
            store,
            _temp_dir: temp_dir,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn pitch(
        date: NaiveDate,
        pitcher_id: i64,
        batter_id: i64,
        balls: i64,
        pitch_type: Option<&str>,
    ) -> PitchEvent {
        PitchEvent {
            date,
            game_date: Some(date),
            player_name: Some("Skenes, Paul".to_string()),
            pitch_type: pitch_type.map(str::to_string),
            game_pk: Some(777001),
            pitcher_id: Some(pitcher_id),
            batter_id: Some(batter_id),
            pitcher: Some(pitcher_id.to_string()),
            batter: Some(batter_id.to_string()),
            balls: Some(balls),
            strikes: Some(0),
            release_speed: Some(99.1),
            ..Default::default()
        }
    }

    fn hitting(date: NaiveDate, name: &str, id: &str) -> HittingLine {
        HittingLine {
            date,
            player_id: Some(id.to_string()),
            player_name: name.to_string(),
            at_bats: Some(4),
            hits: Some(2),
            batting_avg: Some(0.5),
            on_base_pct: Some(0.5),
            slugging_pct: Some(1.0),
            ops: Some(1.5),
            ..Default::default()
        }
    }

    fn pitching(date: NaiveDate, name: &str, era: f64, whip: f64) -> PitchingLine {
        PitchingLine {
            date,
            player_name: name.to_string(),
            innings_pitched: Some(6.0),
            era: Some(era),
            whip: Some(whip),
            ..Default::default()
        }
    }

    fn ledger(date: NaiveDate, records: i64, status: LedgerStatus) -> UpdateLedgerEntry {
        UpdateLedgerEntry {
            update_date: day(28),
            data_date: date,
            records_added: records,
            status,
        }
    }

    #[test]
    fn test_new_store_creates_latest_schema() {
        let test = create_test_store();
        let conn = test.store.conn.lock().unwrap();
        let version: i64 = conn
            .query_row("PRAGMA user_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(
            version as usize,
            BASE_DB_VERSION + SqliteStatsStore::latest_schema().version
        );
        SqliteStatsStore::latest_schema().validate(&conn).unwrap();
    }

    #[test]
    fn test_reopen_existing_store() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("stats.db");
        {
            let store = SqliteStatsStore::new(&db_path).unwrap();
            let batch = DayBatch {
                pitch_events: vec![pitch(day(1), 1, 2, 0, Some("FF"))],
                ..Default::default()
            };
            store.replace_day(day(1), &batch).unwrap();
        }
        let store = SqliteStatsStore::new(&db_path).unwrap();
        assert_eq!(store.count_pitch_events_on(day(1)).unwrap(), 1);
    }

    #[test]
    fn test_migrates_v1_database() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("stats.db");
        {
            let conn = Connection::open(&db_path).unwrap();
            STATS_VERSIONED_SCHEMAS[0].create(&conn).unwrap();
        }

        let store = SqliteStatsStore::new(&db_path).unwrap();
        let conn = store.conn.lock().unwrap();
        let version: i64 = conn
            .query_row("PRAGMA user_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version as usize, BASE_DB_VERSION + 2);
        STATS_VERSIONED_SCHEMAS[1].validate(&conn).unwrap();
    }

    #[test]
    fn test_rejects_foreign_database() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("other.db");
        {
            let conn = Connection::open(&db_path).unwrap();
            conn.execute("CREATE TABLE notes (body TEXT)", []).unwrap();
        }
        assert!(SqliteStatsStore::new(&db_path).is_err());
    }

    #[test]
    fn test_replace_day_is_idempotent() {
        let test = create_test_store();
        let store = &test.store;
        let batch = DayBatch {
            pitch_events: vec![
                pitch(day(3), 1, 2, 0, Some("FF")),
                pitch(day(3), 1, 2, 1, Some("SL")),
            ],
            hitting: vec![hitting(day(3), "Judge, Aaron", "592450")],
            pitching: vec![pitching(day(3), "Skenes, Paul", 1.5, 0.9)],
        };

        let first = store.replace_day(day(3), &batch).unwrap();
        assert_eq!(first.pitch_events_written, 2);
        assert_eq!(first.rows_replaced, 0);

        let second = store.replace_day(day(3), &batch).unwrap();
        assert_eq!(second.pitch_events_written, 2);
        assert_eq!(second.rows_replaced, 4);
        assert_eq!(store.count_pitch_events_on(day(3)).unwrap(), 2);
    }

    #[test]
    fn test_replace_day_leaves_other_days_alone() {
        let test = create_test_store();
        let store = &test.store;
        store
            .replace_day(
                day(3),
                &DayBatch {
                    pitch_events: vec![pitch(day(3), 1, 2, 0, Some("FF"))],
                    ..Default::default()
                },
            )
            .unwrap();
        store.replace_day(day(4), &DayBatch::default()).unwrap();

        assert_eq!(store.count_pitch_events_on(day(3)).unwrap(), 1);
        assert_eq!(store.count_pitch_events_on(day(4)).unwrap(), 0);
    }

    #[test]
    fn test_replace_day_rejects_misdated_rows() {
        let test = create_test_store();
        let batch = DayBatch {
            pitch_events: vec![pitch(day(5), 1, 2, 0, Some("FF"))],
            ..Default::default()
        };
        assert!(test.store.replace_day(day(6), &batch).is_err());
        assert_eq!(test.store.count_pitch_events_on(day(5)).unwrap(), 0);
    }

    #[test]
    fn test_in_batch_collision_keeps_first() {
        let test = create_test_store();
        let store = &test.store;
        let mut duplicate = pitch(day(7), 1, 2, 0, Some("FF"));
        duplicate.release_speed = Some(80.0);
        let batch = DayBatch {
            pitch_events: vec![pitch(day(7), 1, 2, 0, Some("FF")), duplicate],
            ..Default::default()
        };

        let summary = store.replace_day(day(7), &batch).unwrap();
        assert_eq!(summary.pitch_events_written, 1);
        assert_eq!(summary.pitch_events_collided, 1);

        let events = store
            .pitch_events_for(
                &PlayerIdentity::resolved("Skenes, Paul", 1),
                DateRange::new(day(7), day(7)),
            )
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].release_speed, Some(99.1));
    }

    #[test]
    fn test_dedup_groups_null_pitch_types() {
        let test = create_test_store();
        let store = &test.store;
        // UNIQUE treats NULLs as distinct, so both rows are stored.
        let batch = DayBatch {
            pitch_events: vec![
                pitch(day(8), 1, 2, 0, None),
                pitch(day(8), 1, 2, 0, None),
                pitch(day(8), 1, 2, 1, None),
            ],
            ..Default::default()
        };
        store.replace_day(day(8), &batch).unwrap();
        assert_eq!(store.count_pitch_events_on(day(8)).unwrap(), 3);

        assert_eq!(store.remove_duplicate_pitch_events().unwrap(), 1);
        assert_eq!(store.count_pitch_events_on(day(8)).unwrap(), 2);
        assert_eq!(store.remove_duplicate_pitch_events().unwrap(), 0);
    }

    #[test]
    fn test_ledger_last_write_wins() {
        let test = create_test_store();
        let store = &test.store;
        store
            .record_update(&ledger(day(9), 0, LedgerStatus::Error("timeout".to_string())))
            .unwrap();
        store
            .record_update(&ledger(day(9), 250, LedgerStatus::Success))
            .unwrap();

        let updates = store.list_updates().unwrap();
        assert_eq!(updates.len(), 1);
        let entry = store.get_update(day(9)).unwrap().unwrap();
        assert_eq!(entry.records_added, 250);
        assert_eq!(entry.status, LedgerStatus::Success);
        assert!(store.get_update(day(10)).unwrap().is_none());
    }

    #[test]
    fn test_remove_older_than_all_tables() {
        let test = create_test_store();
        let store = &test.store;
        for d in [1, 2, 3] {
            store
                .replace_day(
                    day(d),
                    &DayBatch {
                        pitch_events: vec![pitch(day(d), 1, 2, 0, Some("FF"))],
                        hitting: vec![hitting(day(d), "Judge, Aaron", "592450")],
                        pitching: vec![pitching(day(d), "Skenes, Paul", 2.0, 1.0)],
                    },
                )
                .unwrap();
            store
                .record_update(&ledger(day(d), 1, LedgerStatus::Success))
                .unwrap();
        }

        let counts = store.remove_older_than(day(3)).unwrap();
        assert_eq!(
            counts,
            RetentionCounts {
                hitting: 2,
                pitching: 2,
                pitch_events: 2,
                ledger: 2,
            }
        );
        assert_eq!(store.count_pitch_events_on(day(3)).unwrap(), 1);
        assert_eq!(store.list_updates().unwrap().len(), 1);

        let summary = store.summary().unwrap();
        assert_eq!(summary.oldest_date, Some(day(3)));
    }

    #[test]
    fn test_clear_all() {
        let test = create_test_store();
        let store = &test.store;
        store
            .replace_day(
                day(2),
                &DayBatch {
                    pitch_events: vec![pitch(day(2), 1, 2, 0, Some("FF"))],
                    ..Default::default()
                },
            )
            .unwrap();
        store
            .record_update(&ledger(day(2), 1, LedgerStatus::Success))
            .unwrap();

        let counts = store.clear_all().unwrap();
        assert_eq!(counts.total(), 2);
        assert_eq!(store.summary().unwrap(), StoreSummary::default());
    }

    #[test]
    fn test_player_lookups() {
        let test = create_test_store();
        let store = &test.store;
        store
            .replace_day(
                day(11),
                &DayBatch {
                    pitch_events: vec![
                        pitch(day(11), 100, 200, 0, Some("FF")),
                        pitch(day(11), 300, 100, 0, Some("CU")),
                    ],
                    hitting: vec![hitting(day(11), "Ohtani, Shohei", "100")],
                    pitching: vec![],
                },
            )
            .unwrap();
        let range = DateRange::new(day(1), day(30));

        // By id: pitcher and batter appearances
        let ohtani = PlayerIdentity::resolved("Ohtani, Shohei", 100);
        assert_eq!(store.pitch_events_for(&ohtani, range).unwrap().len(), 2);
        assert_eq!(store.hitting_lines_for(&ohtani, range).unwrap().len(), 1);

        // Name only: pitcher name column
        let by_name = PlayerIdentity::unresolved("Skenes, Paul");
        assert_eq!(store.pitch_events_for(&by_name, range).unwrap().len(), 2);

        let nobody = PlayerIdentity::unresolved("Nobody, Some");
        assert!(store.pitch_events_for(&nobody, range).unwrap().is_empty());
        assert!(store.pitching_lines_for(&nobody, range).unwrap().is_empty());
    }

    #[test]
    fn test_pitch_event_players_roles() {
        let test = create_test_store();
        let store = &test.store;
        store
            .replace_day(
                day(12),
                &DayBatch {
                    pitch_events: vec![
                        pitch(day(12), 100, 200, 0, Some("FF")),
                        pitch(day(12), 100, 200, 1, Some("FF")),
                        pitch(day(12), 300, 100, 0, Some("FF")),
                    ],
                    ..Default::default()
                },
            )
            .unwrap();

        let players = store.pitch_event_players().unwrap();
        assert_eq!(
            players,
            vec![
                PitchEventPlayer { id: 100, as_batter: 1, as_pitcher: 2 },
                PitchEventPlayer { id: 200, as_batter: 2, as_pitcher: 0 },
                PitchEventPlayer { id: 300, as_batter: 0, as_pitcher: 1 },
            ]
        );

        let names = store.pitcher_names_with_counts().unwrap();
        assert_eq!(names, vec![("Skenes, Paul".to_string(), 3)]);
    }

    #[test]
    fn test_league_averages() {
        let test = create_test_store();
        let store = &test.store;
        store
            .replace_day(
                day(13),
                &DayBatch {
                    pitch_events: vec![],
                    hitting: vec![
                        hitting(day(13), "Judge, Aaron", "592450"),
                        HittingLine {
                            batting_avg: Some(0.0),
                            ops: Some(0.5),
                            ..hitting(day(13), "Soto, Juan", "665742")
                        },
                    ],
                    pitching: vec![
                        pitching(day(13), "Skenes, Paul", 2.0, 1.0),
                        pitching(day(13), "Cole, Gerrit", 4.0, 1.4),
                    ],
                },
            )
            .unwrap();

        let averages = store.league_averages(day(13)).unwrap();
        assert_eq!(averages.avg_batting_avg, Some(0.25));
        assert_eq!(averages.avg_ops, Some(1.0));
        assert_eq!(averages.avg_era, Some(3.0));
        assert!((averages.avg_whip.unwrap() - 1.2).abs() < 1e-9);

        let empty = store.league_averages(day(14)).unwrap();
        assert_eq!(empty, LeagueAverages::default());
    }

    #[test]
    fn test_in_memory_store() {
        let store = SqliteStatsStore::in_memory().unwrap();
        assert_eq!(store.summary().unwrap().total_records, 0);
    }
}
