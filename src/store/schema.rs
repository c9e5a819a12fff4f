//! SQLite schema definitions for the stats database.
//!
//! Every table carries a `date` column (ISO `YYYY-MM-DD`) which is the
//! partition key used by day replacement and retention.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};

// =============================================================================
// Version 1 - Daily lines, pitch events and update ledger
// =============================================================================

pub const DAILY_HITTING_TABLE: Table = Table {
    name: "daily_hitting",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("date", &SqlType::Text, non_null = true),
        sqlite_column!("player_id", &SqlType::Text),
        sqlite_column!("player_name", &SqlType::Text, non_null = true),
        sqlite_column!("team", &SqlType::Text),
        // Counting stats
        sqlite_column!("games", &SqlType::Integer),
        sqlite_column!("plate_appearances", &SqlType::Integer),
        sqlite_column!("at_bats", &SqlType::Integer),
        sqlite_column!("runs", &SqlType::Integer),
        sqlite_column!("hits", &SqlType::Integer),
        sqlite_column!("doubles", &SqlType::Integer),
        sqlite_column!("triples", &SqlType::Integer),
        sqlite_column!("home_runs", &SqlType::Integer),
        sqlite_column!("rbi", &SqlType::Integer),
        sqlite_column!("stolen_bases", &SqlType::Integer),
        sqlite_column!("caught_stealing", &SqlType::Integer),
        sqlite_column!("walks", &SqlType::Integer),
        sqlite_column!("strikeouts", &SqlType::Integer),
        // Rate stats
        sqlite_column!("batting_avg", &SqlType::Real),
        sqlite_column!("on_base_pct", &SqlType::Real),
        sqlite_column!("slugging_pct", &SqlType::Real),
        sqlite_column!("ops", &SqlType::Real),
        sqlite_column!("woba", &SqlType::Real),
        sqlite_column!("wrc_plus", &SqlType::Real),
        sqlite_column!("war", &SqlType::Real),
    ],
    indices: &[
        ("idx_hitting_date", "date"),
        ("idx_hitting_player", "player_name"),
    ],
    unique_constraints: &[&["date", "player_name"]],
};

pub const DAILY_PITCHING_TABLE: Table = Table {
    name: "daily_pitching",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("date", &SqlType::Text, non_null = true),
        sqlite_column!("player_id", &SqlType::Text),
        sqlite_column!("player_name", &SqlType::Text, non_null = true),
        sqlite_column!("team", &SqlType::Text),
        sqlite_column!("games", &SqlType::Integer),
        sqlite_column!("games_started", &SqlType::Integer),
        sqlite_column!("innings_pitched", &SqlType::Real),
        sqlite_column!("hits_allowed", &SqlType::Integer),
        sqlite_column!("runs_allowed", &SqlType::Integer),
        sqlite_column!("earned_runs", &SqlType::Integer),
        sqlite_column!("home_runs_allowed", &SqlType::Integer),
        sqlite_column!("walks_allowed", &SqlType::Integer),
        sqlite_column!("strikeouts", &SqlType::Integer),
        sqlite_column!("era", &SqlType::Real),
        sqlite_column!("whip", &SqlType::Real),
        sqlite_column!("fip", &SqlType::Real),
        sqlite_column!("xfip", &SqlType::Real),
        sqlite_column!("war", &SqlType::Real),
        sqlite_column!("saves", &SqlType::Integer),
        sqlite_column!("holds", &SqlType::Integer),
    ],
    indices: &[
        ("idx_pitching_date", "date"),
        ("idx_pitching_player", "player_name"),
    ],
    unique_constraints: &[&["date", "player_name"]],
};

/// The columns after `id` are the pitch event allow-list, in insert order.
pub const STATCAST_TABLE_V1: Table = Table {
    name: "statcast_data",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("date", &SqlType::Text, non_null = true),
        sqlite_column!("player_id", &SqlType::Text),
        sqlite_column!("player_name", &SqlType::Text),
        sqlite_column!("pitch_type", &SqlType::Text),
        sqlite_column!("game_date", &SqlType::Text),
        sqlite_column!("release_speed", &SqlType::Real),
        sqlite_column!("release_pos_x", &SqlType::Real),
        sqlite_column!("release_pos_y", &SqlType::Real),
        sqlite_column!("release_pos_z", &SqlType::Real),
        sqlite_column!("batter", &SqlType::Text),
        sqlite_column!("pitcher", &SqlType::Text),
        sqlite_column!("events", &SqlType::Text),
        sqlite_column!("description", &SqlType::Text),
        sqlite_column!("zone", &SqlType::Integer),
        sqlite_column!("stand", &SqlType::Text),
        sqlite_column!("p_throws", &SqlType::Text),
        sqlite_column!("home_team", &SqlType::Text),
        sqlite_column!("away_team", &SqlType::Text),
        sqlite_column!("type", &SqlType::Text),
        sqlite_column!("hit_location", &SqlType::Integer),
        sqlite_column!("bb_type", &SqlType::Text),
        sqlite_column!("balls", &SqlType::Integer),
        sqlite_column!("strikes", &SqlType::Integer),
        sqlite_column!("pfx_x", &SqlType::Real),
        sqlite_column!("pfx_z", &SqlType::Real),
        sqlite_column!("plate_x", &SqlType::Real),
        sqlite_column!("plate_z", &SqlType::Real),
        sqlite_column!("vx0", &SqlType::Real),
        sqlite_column!("vy0", &SqlType::Real),
        sqlite_column!("vz0", &SqlType::Real),
        sqlite_column!("ax", &SqlType::Real),
        sqlite_column!("ay", &SqlType::Real),
        sqlite_column!("az", &SqlType::Real),
        sqlite_column!("sz_top", &SqlType::Real),
        sqlite_column!("sz_bot", &SqlType::Real),
        sqlite_column!("hit_distance_sc", &SqlType::Real),
        sqlite_column!("launch_speed", &SqlType::Real),
        sqlite_column!("launch_angle", &SqlType::Real),
        sqlite_column!("effective_speed", &SqlType::Real),
        sqlite_column!("release_spin_rate", &SqlType::Real),
        sqlite_column!("release_extension", &SqlType::Real),
        sqlite_column!("game_pk", &SqlType::Integer),
        sqlite_column!("pitcher_id", &SqlType::Integer),
        sqlite_column!("batter_id", &SqlType::Integer),
        sqlite_column!("hc_x", &SqlType::Real),
        sqlite_column!("hc_y", &SqlType::Real),
        sqlite_column!("barrel", &SqlType::Integer),
    ],
    indices: &[
        ("idx_statcast_date", "date"),
        ("idx_statcast_player", "player_name"),
    ],
    unique_constraints: &[&[
        "date",
        "game_pk",
        "pitcher_id",
        "batter_id",
        "balls",
        "strikes",
        "pitch_type",
    ]],
};

pub const DATA_UPDATES_TABLE: Table = Table {
    name: "data_updates",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("update_date", &SqlType::Text, non_null = true),
        sqlite_column!("data_date", &SqlType::Text, non_null = true),
        sqlite_column!("records_added", &SqlType::Integer),
        sqlite_column!("status", &SqlType::Text),
    ],
    indices: &[],
    unique_constraints: &[&["data_date"]],
};

// =============================================================================
// Version 2 - Id lookups on pitch events
// =============================================================================

/// Identity-based player lookups match on pitcher_id / batter_id.
pub const STATCAST_TABLE_V2: Table = Table {
    indices: &[
        ("idx_statcast_date", "date"),
        ("idx_statcast_player", "player_name"),
        ("idx_statcast_pitcher_id", "pitcher_id"),
        ("idx_statcast_batter_id", "batter_id"),
    ],
    ..STATCAST_TABLE_V1
};

fn migrate_v1_to_v2(conn: &rusqlite::Connection) -> anyhow::Result<()> {
    STATCAST_TABLE_V2.create_index(conn, "idx_statcast_pitcher_id", "pitcher_id")?;
    STATCAST_TABLE_V2.create_index(conn, "idx_statcast_batter_id", "batter_id")?;
    Ok(())
}

pub const STATS_VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 1,
        tables: &[
            DAILY_HITTING_TABLE,
            DAILY_PITCHING_TABLE,
            STATCAST_TABLE_V1,
            DATA_UPDATES_TABLE,
        ],
        migration: None,
    },
    VersionedSchema {
        version: 2,
        tables: &[
            DAILY_HITTING_TABLE,
            DAILY_PITCHING_TABLE,
            STATCAST_TABLE_V2,
            DATA_UPDATES_TABLE,
        ],
        migration: Some(migrate_v1_to_v2),
    },
];

/// Tables holding date-partitioned rows, with the column retention filters on.
pub const DATED_TABLES: &[(&str, &str)] = &[
    ("daily_hitting", "date"),
    ("daily_pitching", "date"),
    ("statcast_data", "date"),
    ("data_updates", "data_date"),
];
