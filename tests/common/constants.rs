//! Shared constants for end-to-end tests

#![allow(dead_code)]

// ============================================================================
// Players
// ============================================================================

pub const JUDGE_ID: i64 = 592450;
pub const JUDGE_NAME: &str = "Judge, Aaron";

pub const SKENES_ID: i64 = 694973;
pub const SKENES_NAME: &str = "Skenes, Paul";

pub const OHTANI_ID: i64 = 660271;
pub const OHTANI_NAME: &str = "Ohtani, Shohei";

// ============================================================================
// Games
// ============================================================================

pub const GAME_PK: i64 = 745001;
pub const HOME_TEAM: &str = "PIT";
pub const AWAY_TEAM: &str = "NYY";
