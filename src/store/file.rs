use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::FactStore;
use crate::availability::{AvailabilityFact, FactSet};
use crate::catalog::{GameId, PlayerId};
use crate::error::StoreError;

pub const FACTS_SCHEMA_VERSION: u32 = 1;

/// One stored fact row. `updated_at` records when the pair first appeared
/// and is diagnostics only; the engine never reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedFact {
    player_id: PlayerId,
    game_id: GameId,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedFacts {
    schema_version: u32,
    saved_at: DateTime<Utc>,
    entries: Vec<PersistedFact>,
}

/// File-backed fact store: one JSON document holding the whole set.
///
/// A replace writes the new document to a sibling `.tmp` file and renames
/// it over the target, so readers only ever see the old or the new
/// complete set. The rename is the commit point.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Option<PersistedFacts>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StoreError::Unavailable(format!(
                    "read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let persisted: PersistedFacts = serde_json::from_slice(&bytes).map_err(|e| {
            StoreError::Unavailable(format!("parse {}: {}", self.path.display(), e))
        })?;

        if persisted.schema_version != FACTS_SCHEMA_VERSION {
            return Err(StoreError::Unavailable(format!(
                "unsupported schema version {} in {} (expected {})",
                persisted.schema_version,
                self.path.display(),
                FACTS_SCHEMA_VERSION
            )));
        }

        Ok(Some(persisted))
    }
}

impl FactStore for JsonFileStore {
    fn read_all(&self) -> Result<FactSet, StoreError> {
        let Some(persisted) = self.load()? else {
            return Ok(FactSet::new());
        };
        Ok(persisted
            .entries
            .iter()
            .map(|row| AvailabilityFact::new(row.player_id, row.game_id))
            .collect())
    }

    fn replace_all(&mut self, facts: &FactSet) -> Result<(), StoreError> {
        // Pairs that survive the replace keep their first-seen timestamp.
        // An unreadable prior file only costs those timestamps; the next
        // save repairs it.
        let prior: BTreeMap<AvailabilityFact, DateTime<Utc>> = match self.load() {
            Ok(Some(persisted)) => persisted
                .entries
                .into_iter()
                .map(|row| {
                    (
                        AvailabilityFact::new(row.player_id, row.game_id),
                        row.updated_at,
                    )
                })
                .collect(),
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                log::warn!("discarding unreadable prior facts file: {}", e);
                BTreeMap::new()
            }
        };

        let now = Utc::now();
        let entries: Vec<PersistedFact> = facts
            .iter()
            .map(|fact| PersistedFact {
                player_id: fact.player_id,
                game_id: fact.game_id,
                updated_at: prior.get(fact).copied().unwrap_or(now),
            })
            .collect();

        let persisted = PersistedFacts {
            schema_version: FACTS_SCHEMA_VERSION,
            saved_at: now,
            entries,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StoreError::Unavailable(format!("create {}: {}", parent.display(), e))
            })?;
        }

        let bytes = serde_json::to_vec_pretty(&persisted)
            .map_err(|e| StoreError::Unavailable(format!("encode facts: {}", e)))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes).map_err(|e| {
            StoreError::Unavailable(format!("write {}: {}", tmp.display(), e))
        })?;

        // Commit point. The old file stays intact up to here; a rename
        // failure leaves durability unknown, which is the one case the
        // caller must treat as possible data loss.
        fs::rename(&tmp, &self.path).map_err(|e| {
            StoreError::PartialReplace(format!(
                "rename {} over {}: {}",
                tmp.display(),
                self.path.display(),
                e
            ))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::facts;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> JsonFileStore {
        JsonFileStore::new(dir.path().join("availability.json"))
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn replace_then_read_round_trips() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        let snapshot = facts(&[(1, 2), (3, 1), (2, 2)]);
        store.replace_all(&snapshot).unwrap();
        assert_eq!(store.read_all().unwrap(), snapshot);

        // No tmp file left behind after a successful commit.
        assert!(!dir.path().join("availability.json.tmp").exists());
    }

    #[test]
    fn replacing_with_own_contents_is_a_noop() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store.replace_all(&facts(&[(1, 1), (2, 2)])).unwrap();
        let first = store.load().unwrap().unwrap();

        let snapshot = store.read_all().unwrap();
        store.replace_all(&snapshot).unwrap();
        let second = store.load().unwrap().unwrap();

        assert_eq!(store.read_all().unwrap(), snapshot);
        // Surviving pairs keep their original timestamps, so the rows are
        // unchanged, not merely equivalent.
        for (before, after) in first.entries.iter().zip(second.entries.iter()) {
            assert_eq!(before.player_id, after.player_id);
            assert_eq!(before.game_id, after.game_id);
            assert_eq!(before.updated_at, after.updated_at);
        }
    }

    #[test]
    fn surviving_pairs_keep_timestamps_new_pairs_get_stamped() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store.replace_all(&facts(&[(1, 1)])).unwrap();
        let first = store.load().unwrap().unwrap();
        let original_ts = first.entries[0].updated_at;

        store.replace_all(&facts(&[(1, 1), (2, 2)])).unwrap();
        let second = store.load().unwrap().unwrap();

        let survivor = second
            .entries
            .iter()
            .find(|row| row.player_id == 1)
            .unwrap();
        assert_eq!(survivor.updated_at, original_ts);

        let newcomer = second
            .entries
            .iter()
            .find(|row| row.player_id == 2)
            .unwrap();
        assert!(newcomer.updated_at >= original_ts);
        assert_eq!(second.saved_at, newcomer.updated_at);
    }

    #[test]
    fn unknown_schema_version_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("availability.json");
        fs::write(
            &path,
            r#"{"schemaVersion": 99, "savedAt": "2026-01-01T00:00:00Z", "entries": []}"#,
        )
        .unwrap();

        let store = JsonFileStore::new(&path);
        let err = store.read_all().unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(err.to_string().contains("schema version 99"));
    }

    #[test]
    fn corrupt_file_fails_reads_but_replace_recovers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("availability.json");
        fs::write(&path, "not json at all").unwrap();

        let mut store = JsonFileStore::new(&path);
        assert!(matches!(
            store.read_all(),
            Err(StoreError::Unavailable(_))
        ));

        let snapshot = facts(&[(4, 4)]);
        store.replace_all(&snapshot).unwrap();
        assert_eq!(store.read_all().unwrap(), snapshot);
    }
}
