//! Id/name lookups over the provider's player register.
//!
//! The register is fetched on first use and kept for the lifetime of the
//! directory. A failed load is not cached, so the next lookup retries.

use super::PlayerIdentity;
use crate::provider::{PlayerEntry, PlayerRegistry};
use anyhow::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Lowercases and collapses whitespace, so "  JUDGE,  aaron " and
/// "Judge, Aaron" map to the same key.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Turns "Aaron Judge" into "Judge, Aaron". Names already containing a comma
/// are returned trimmed.
pub fn to_last_first(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.contains(',') {
        return trimmed.to_string();
    }
    match trimmed.split_once(' ') {
        Some((first, last)) => format!("{}, {}", last.trim(), first),
        None => trimmed.to_string(),
    }
}

#[derive(Debug, Default)]
struct DirectoryIndex {
    names_by_id: HashMap<i64, String>,
    ids_by_name: HashMap<String, i64>,
}

impl DirectoryIndex {
    fn build(entries: Vec<PlayerEntry>) -> Self {
        let mut index = DirectoryIndex::default();
        for entry in entries {
            index
                .ids_by_name
                .entry(normalize_name(&entry.last_first_name))
                .or_insert(entry.id);
            index
                .ids_by_name
                .entry(normalize_name(&entry.full_name))
                .or_insert(entry.id);
            index.names_by_id.insert(entry.id, entry.last_first_name);
        }
        index
    }
}

pub struct PlayerDirectory {
    registry: Arc<dyn PlayerRegistry>,
    index: Mutex<Option<Arc<DirectoryIndex>>>,
}

impl PlayerDirectory {
    pub fn new(registry: Arc<dyn PlayerRegistry>) -> Self {
        Self {
            registry,
            index: Mutex::new(None),
        }
    }

    fn index(&self) -> Result<Arc<DirectoryIndex>> {
        let mut guard = self.index.lock().unwrap();
        if let Some(index) = guard.as_ref() {
            return Ok(index.clone());
        }

        let entries = self.registry.load_players()?;
        info!("Loaded player directory with {} players", entries.len());
        let index = Arc::new(DirectoryIndex::build(entries));
        *guard = Some(index.clone());
        Ok(index)
    }

    pub fn is_loaded(&self) -> bool {
        self.index.lock().unwrap().is_some()
    }

    /// Forces the register to load. Lookups call this implicitly.
    pub fn load(&self) -> Result<usize> {
        Ok(self.index()?.names_by_id.len())
    }

    /// "Last, First" name for a provider id.
    pub fn name_for(&self, id: i64) -> Result<Option<String>> {
        Ok(self.index()?.names_by_id.get(&id).cloned())
    }

    /// Id for a name in either "Last, First" or "First Last" form,
    /// case-insensitive.
    pub fn id_for(&self, name: &str) -> Result<Option<i64>> {
        Ok(self.index()?.ids_by_name.get(&normalize_name(name)).copied())
    }

    /// Resolves a user-supplied name once. Misses and register failures
    /// degrade to a name-only identity.
    pub fn resolve(&self, name: &str) -> PlayerIdentity {
        let index = match self.index() {
            Ok(index) => index,
            Err(err) => {
                warn!("Player directory unavailable, matching by name only: {:#}", err);
                return PlayerIdentity::unresolved(to_last_first(name));
            }
        };

        match index.ids_by_name.get(&normalize_name(name)) {
            Some(id) => {
                let canonical = index
                    .names_by_id
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| to_last_first(name));
                PlayerIdentity::resolved(canonical, *id)
            }
            None => PlayerIdentity::unresolved(to_last_first(name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingRegistry {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingRegistry {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    impl PlayerRegistry for CountingRegistry {
        fn load_players(&self) -> Result<Vec<PlayerEntry>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ProviderError::Status {
                    status: 503,
                    url: "/api/v1/sports/1/players".to_string(),
                });
            }
            Ok(vec![
                PlayerEntry {
                    id: 592450,
                    full_name: "Aaron Judge".to_string(),
                    last_first_name: "Judge, Aaron".to_string(),
                },
                PlayerEntry {
                    id: 660271,
                    full_name: "Shohei Ohtani".to_string(),
                    last_first_name: "Ohtani, Shohei".to_string(),
                },
            ])
        }
    }

    #[test]
    fn test_name_normalization() {
        assert_eq!(normalize_name("  JUDGE,  aaron "), "judge, aaron");
        assert_eq!(to_last_first("Aaron Judge"), "Judge, Aaron");
        assert_eq!(to_last_first("Elly De La Cruz"), "De La Cruz, Elly");
        assert_eq!(to_last_first("Judge, Aaron"), "Judge, Aaron");
        assert_eq!(to_last_first("Ichiro"), "Ichiro");
    }

    #[test]
    fn test_lookups_both_directions() {
        let directory = PlayerDirectory::new(Arc::new(CountingRegistry::new(false)));
        assert_eq!(
            directory.name_for(592450).unwrap(),
            Some("Judge, Aaron".to_string())
        );
        assert_eq!(directory.id_for("judge, aaron").unwrap(), Some(592450));
        assert_eq!(directory.id_for("Shohei Ohtani").unwrap(), Some(660271));
        assert_eq!(directory.id_for("Nobody, Some").unwrap(), None);
        assert_eq!(directory.name_for(1).unwrap(), None);
    }

    #[test]
    fn test_loads_once() {
        let registry = Arc::new(CountingRegistry::new(false));
        let directory = PlayerDirectory::new(registry.clone());
        assert!(!directory.is_loaded());

        directory.id_for("Judge, Aaron").unwrap();
        directory.name_for(660271).unwrap();
        directory.resolve("Aaron Judge");

        assert!(directory.is_loaded());
        assert_eq!(registry.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_resolve_canonicalizes_name() {
        let directory = PlayerDirectory::new(Arc::new(CountingRegistry::new(false)));
        assert_eq!(
            directory.resolve("aaron judge"),
            PlayerIdentity::resolved("Judge, Aaron", 592450)
        );
        assert_eq!(
            directory.resolve("Paul Skenes"),
            PlayerIdentity::unresolved("Skenes, Paul")
        );
    }

    #[test]
    fn test_resolve_degrades_when_register_fails() {
        let registry = Arc::new(CountingRegistry::new(true));
        let directory = PlayerDirectory::new(registry.clone());

        assert_eq!(
            directory.resolve("Judge, Aaron"),
            PlayerIdentity::unresolved("Judge, Aaron")
        );
        assert!(directory.id_for("Judge, Aaron").is_err());
        assert!(!directory.is_loaded());
        assert_eq!(registry.calls.load(Ordering::SeqCst), 2);
    }
}
