mod dedup;
mod regenerate;
mod retention;

pub use dedup::remove_duplicate_pitch_events;
pub use regenerate::{backfill_range, regenerate, RegenerationReport};
pub use retention::{RetentionSweeper, SweepReport, DEFAULT_RETENTION_DAYS};
