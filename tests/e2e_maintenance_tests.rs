//! End-to-end tests for retention, deduplication and regeneration.

mod common;

use chrono::Local;
use common::*;
use mlb_daily_stats::ingest::FetchDriver;
use mlb_daily_stats::maintenance::{
    backfill_range, regenerate, remove_duplicate_pitch_events, RetentionSweeper,
};
use mlb_daily_stats::store::{format_date, DayBatch, StatsStore, UpdateLedgerEntry, LedgerStatus};
use rusqlite::Connection;
use std::sync::Arc;

fn batch_for(date: chrono::NaiveDate) -> DayBatch {
    let skenes = (SKENES_ID, SKENES_NAME);
    DayBatch {
        pitch_events: vec![
            pitch(date, skenes, JUDGE_ID, (0, 0), Some("FF")),
            pitch(date, skenes, JUDGE_ID, (0, 1), Some("CH")),
        ],
        hitting: vec![hitting_line(date, JUDGE_ID, JUDGE_NAME)],
        pitching: vec![pitching_line(date, SKENES_ID, SKENES_NAME)],
    }
}

fn min_date(conn: &Connection, table: &str, column: &str) -> Option<String> {
    conn.query_row(&format!("SELECT MIN({}) FROM {}", column, table), [], |row| {
        row.get(0)
    })
    .unwrap()
}

// =============================================================================
// Retention
// =============================================================================

#[test]
fn test_retention_sweep_removes_old_rows_from_every_table() {
    let test_store = temp_store();
    for d in [5, 9, 10, 15] {
        test_store.store.replace_day(day(d), &batch_for(day(d))).unwrap();
        test_store
            .store
            .record_update(&UpdateLedgerEntry {
                update_date: day(d),
                data_date: day(d),
                records_added: 2,
                status: LedgerStatus::Success,
            })
            .unwrap();
    }

    let sweeper = RetentionSweeper::new(test_store.store.clone(), 10);
    let report = sweeper.sweep(day(20)).unwrap();

    assert_eq!(report.cutoff, day(10));
    assert_eq!(report.deleted.pitch_events, 4);
    assert_eq!(report.deleted.hitting, 2);
    assert_eq!(report.deleted.pitching, 2);
    assert_eq!(report.deleted.ledger, 2);

    let conn = Connection::open(&test_store.db_path).unwrap();
    let cutoff = format_date(day(10));
    for (table, column) in [
        ("statcast_data", "date"),
        ("daily_hitting", "date"),
        ("daily_pitching", "date"),
        ("data_updates", "data_date"),
    ] {
        let oldest = min_date(&conn, table, column).unwrap();
        assert!(oldest >= cutoff, "{} still holds {}", table, oldest);
    }
    let summary = test_store.store.summary().unwrap();
    assert_eq!(summary.days_covered, 2);
    assert_eq!(summary.oldest_date, Some(day(10)));
}

#[test]
fn test_retention_sweep_on_empty_store() {
    let test_store = temp_store();
    let report = RetentionSweeper::new(test_store.store.clone(), 45)
        .sweep(day(20))
        .unwrap();
    assert_eq!(report.deleted.total(), 0);
}

// =============================================================================
// Deduplication
// =============================================================================

#[test]
fn test_dedup_leaves_one_row_per_natural_key() {
    let test_store = temp_store();
    let skenes = (SKENES_ID, SKENES_NAME);
    // Untyped pitches are never rejected by the unique index
    let untyped = pitch(day(12), skenes, JUDGE_ID, (2, 2), None);
    let batch = DayBatch {
        pitch_events: vec![
            untyped.clone(),
            untyped.clone(),
            untyped,
            pitch(day(12), skenes, JUDGE_ID, (0, 0), Some("FF")),
            pitch(day(12), skenes, JUDGE_ID, (0, 0), Some("FF")),
        ],
        ..Default::default()
    };
    let written = test_store.store.replace_day(day(12), &batch).unwrap();
    assert_eq!(written.pitch_events_written, 4);
    assert_eq!(written.pitch_events_collided, 1);

    let removed = remove_duplicate_pitch_events(test_store.store.as_ref()).unwrap();
    assert_eq!(removed, 2);
    assert_eq!(test_store.store.count_pitch_events_on(day(12)).unwrap(), 2);

    let conn = Connection::open(&test_store.db_path).unwrap();
    let duplicated_groups: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM (
                SELECT COUNT(*) AS n FROM statcast_data
                GROUP BY date, game_pk, pitcher_id, batter_id, balls, strikes, pitch_type
                HAVING n > 1
            )",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(duplicated_groups, 0);

    assert_eq!(
        remove_duplicate_pitch_events(test_store.store.as_ref()).unwrap(),
        0
    );
}

// =============================================================================
// Regeneration
// =============================================================================

#[test]
fn test_regenerate_wipes_and_refetches_window() {
    let test_store = temp_store();
    let today = Local::now().date_naive();
    let range = backfill_range(today, 5);
    let stale_day = range.start - chrono::Duration::days(30);
    test_store
        .store
        .replace_day(stale_day, &batch_for(stale_day))
        .unwrap();

    let mut source = FakeSource::new();
    for date in range.days().step_by(2) {
        source = source.with_day(date, batch_for(date));
    }
    let source = Arc::new(source);
    let driver = FetchDriver::new(test_store.store.clone(), source.clone());

    let report = regenerate(test_store.store.clone(), &driver, today, 5).unwrap();

    assert_eq!(source.calls(), range.days().collect::<Vec<_>>());
    assert_eq!(report.fetch.outcomes.len(), 5);
    assert_eq!(report.fetch.total_records(), 6);
    assert_eq!(report.summary.days_covered, 3);
    assert_eq!(report.summary.oldest_date, Some(range.start));
    assert_eq!(test_store.store.count_pitch_events_on(stale_day).unwrap(), 0);
    assert_eq!(test_store.store.list_updates().unwrap().len(), 5);
}
