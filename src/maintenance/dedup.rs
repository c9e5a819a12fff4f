use crate::store::StatsStore;
use anyhow::Result;
use tracing::info;

/// Deletes pitch events sharing the natural key with a lower-id row.
/// Returns the number of rows removed.
pub fn remove_duplicate_pitch_events(store: &dyn StatsStore) -> Result<usize> {
    let before = store.summary()?.total_records;
    let removed = store.remove_duplicate_pitch_events()?;
    info!(
        "Removed {} duplicate pitch events ({} -> {} rows)",
        removed,
        before,
        before - removed
    );
    Ok(removed)
}
