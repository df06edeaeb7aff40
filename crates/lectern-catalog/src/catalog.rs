//! The on-disk record catalog.

use crate::error::CatalogResult;
use lectern_core::{Record, RecordId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// In-memory catalog of indexed records, persisted as one JSON file.
///
/// The whole file is read at command start and written back in full after
/// every mutation. That caps the catalog at what fits in memory, which for
/// per-record summaries is nowhere near a concern.
///
/// Record ids are dense: the catalog of N records always allocates N + 1
/// next, so ids stay stable only because records are never removed.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(rename = "UUID", default)]
    records: BTreeMap<RecordId, Record>,
}

impl Catalog {
    /// Load the catalog at `path`, treating a missing or unreadable file as
    /// empty. A corrupt catalog is reported but never blocks a command; the
    /// next save overwrites it.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            debug!("No catalog at {}, starting empty", path.display());
            return Self::default();
        }

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(
                    "Could not read catalog {}: {}. Starting empty.",
                    path.display(),
                    e
                );
                return Self::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!(
                    "Could not parse catalog {}: {}. Starting empty.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Write the whole catalog to `path`, replacing the previous contents.
    pub fn save(&self, path: &Path) -> CatalogResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        debug!("Saved catalog ({} records) to {}", self.len(), path.display());
        Ok(())
    }

    /// Id for the next record. Ids are dense, so this is always `len + 1`.
    pub fn next_id(&self) -> RecordId {
        self.records.len() as RecordId + 1
    }

    /// Insert a record under `id`. The caller persists with [`Catalog::save`].
    pub fn insert(&mut self, id: RecordId, record: Record) {
        self.records.insert(id, record);
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.get(&id)
    }

    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut Record> {
        self.records.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in id order.
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &Record)> {
        self.records.iter().map(|(id, record)| (*id, record))
    }

    /// All summaries keyed by id, as handed to relevance selection.
    pub fn summaries(&self) -> BTreeMap<RecordId, String> {
        self.records
            .iter()
            .map(|(id, record)| (*id, record.summary.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_core::MediaKind;
    use std::path::PathBuf;

    fn sample_record(name: &str) -> Record {
        Record::new(MediaKind::Text, name)
            .with_artifacts(vec![PathBuf::from(format!("lectures/1.{}", name))])
            .with_summary("A test summary.")
    }

    #[test]
    fn test_next_id_is_dense() {
        let mut catalog = Catalog::default();
        assert_eq!(catalog.next_id(), 1);

        catalog.insert(1, sample_record("a.txt"));
        assert_eq!(catalog.next_id(), 2);

        catalog.insert(2, sample_record("b.txt"));
        assert_eq!(catalog.next_id(), 3);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");

        let mut catalog = Catalog::default();
        catalog.insert(1, sample_record("notes.txt"));
        catalog.insert(2, sample_record("more.txt"));
        catalog.save(&path).unwrap();

        let loaded = Catalog::load(&path);
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.next_id(), 3);
        assert_eq!(loaded.get(1).unwrap().filename, "notes.txt");
        assert!(loaded.get(3).is_none());
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::load(&dir.path().join("nonexistent.json"));
        assert!(catalog.is_empty());
        assert_eq!(catalog.next_id(), 1);
    }

    #[test]
    fn test_load_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "{ not json at all").unwrap();

        let catalog = Catalog::load(&path);
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_wire_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");

        let mut catalog = Catalog::default();
        catalog.insert(1, sample_record("a.txt"));
        catalog.save(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        // Records live under the top-level map, keyed by the id as a string.
        assert!(value["UUID"]["1"]["Filename"].is_string());
        assert_eq!(value["UUID"]["1"]["Archive"], "");
    }

    #[test]
    fn test_summaries_snapshot() {
        let mut catalog = Catalog::default();
        catalog.insert(1, sample_record("a.txt"));
        catalog.insert(2, sample_record("b.txt").with_summary("Another."));

        let summaries = catalog.summaries();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[&2], "Another.");
    }
}
