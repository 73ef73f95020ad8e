use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::core::error::{Error, Result};
use crate::core::types::{Metadata, RecordId, Tags};
use crate::dataset::dataset::{Dataset, DatasetStats, DatasetSummary};
use crate::record::model::NormalizedRecord;

/// Registry mapping dataset name to its record collection.
///
/// The outer lock only guards the map; each dataset carries its own lock, so
/// mutations are serialized per dataset while reads on other datasets stay
/// concurrent.
pub struct DatasetStore {
    datasets: RwLock<HashMap<String, Arc<RwLock<Dataset>>>>,
}

impl DatasetStore {
    pub fn new() -> Self {
        DatasetStore {
            datasets: RwLock::new(HashMap::new()),
        }
    }

    /// Remove a dataset and all its records. Idempotent: removing an absent
    /// name is a successful no-op.
    pub fn delete(&self, name: &str) -> bool {
        let removed = self.datasets.write().remove(name).is_some();
        if removed {
            debug!(dataset = name, "dataset deleted");
        }
        removed
    }

    /// Return the dataset handle, creating it if absent. Dataset-level tags
    /// and metadata are last-writer-wins; existing records are never lost.
    pub fn create_or_get(
        &self,
        name: &str,
        tags: Tags,
        metadata: Metadata,
    ) -> Arc<RwLock<Dataset>> {
        if let Some(existing) = self.datasets.read().get(name) {
            let handle = existing.clone();
            handle.write().update_attributes(tags, metadata);
            return handle;
        }

        let mut datasets = self.datasets.write();
        // Re-check under the write lock; another writer may have won the race
        if let Some(existing) = datasets.get(name) {
            let handle = existing.clone();
            handle.write().update_attributes(tags, metadata);
            return handle;
        }

        debug!(dataset = name, "dataset created");
        let handle = Arc::new(RwLock::new(Dataset::new(name.to_string(), tags, metadata)));
        datasets.insert(name.to_string(), handle.clone());
        handle
    }

    pub fn get(&self, name: &str) -> Option<Arc<RwLock<Dataset>>> {
        self.datasets.read().get(name).cloned()
    }

    /// Append validated records, creating the dataset if needed. Returns the
    /// dataset incarnation id and the assigned record ids.
    pub fn append(
        &self,
        name: &str,
        tags: Tags,
        metadata: Metadata,
        records: Vec<NormalizedRecord>,
    ) -> (uuid::Uuid, Vec<RecordId>) {
        let handle = self.create_or_get(name, tags, metadata);
        let mut dataset = handle.write();
        let ids = dataset.append(records);
        (dataset.id, ids)
    }

    pub fn list(&self) -> Vec<DatasetSummary> {
        let mut summaries: Vec<DatasetSummary> = self
            .datasets
            .read()
            .values()
            .map(|handle| handle.read().summary())
            .collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        summaries
    }

    pub fn stats(&self, name: &str) -> Result<DatasetStats> {
        self.get(name)
            .map(|handle| handle.read().stats())
            .ok_or_else(|| Error::DatasetNotFound(name.to_string()))
    }
}

impl Default for DatasetStore {
    fn default() -> Self {
        DatasetStore::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tokenizer::WhitespaceTokenizer;
    use crate::record::model::TokenClassificationRecord;

    fn normalized(text: &str) -> NormalizedRecord {
        let record = TokenClassificationRecord {
            tokens: vec![],
            raw_text: Some(text.to_string()),
            metadata: Metadata::new(),
            event_timestamp: None,
        };
        NormalizedRecord::from_tokens(record, &WhitespaceTokenizer).unwrap()
    }

    #[test]
    fn delete_is_idempotent() {
        let store = DatasetStore::new();
        assert!(!store.delete("missing"));
        store.create_or_get("ds", Tags::new(), Metadata::new());
        assert!(store.delete("ds"));
        assert!(!store.delete("ds"));
    }

    #[test]
    fn append_creates_dataset_implicitly() {
        let store = DatasetStore::new();
        let (_, ids) = store.append(
            "fresh",
            Tags::new(),
            Metadata::new(),
            vec![normalized("a record")],
        );
        assert_eq!(ids, vec![RecordId(1)]);
        assert_eq!(store.stats("fresh").unwrap().total_records, 1);
    }

    #[test]
    fn recreated_dataset_gets_a_new_incarnation_id() {
        let store = DatasetStore::new();
        let (first, _) = store.append("ds", Tags::new(), Metadata::new(), vec![normalized("a")]);
        store.delete("ds");
        let (second, ids) =
            store.append("ds", Tags::new(), Metadata::new(), vec![normalized("b")]);
        assert_ne!(first, second);
        // Sequence restarts with the new incarnation
        assert_eq!(ids, vec![RecordId(1)]);
    }

    #[test]
    fn stats_on_missing_dataset_is_not_found() {
        let store = DatasetStore::new();
        assert!(matches!(
            store.stats("missing"),
            Err(Error::DatasetNotFound(_))
        ));
    }

    #[test]
    fn reingestion_overwrites_dataset_attributes_only() {
        let store = DatasetStore::new();
        store.append(
            "ds",
            Tags::from([("env".to_string(), "test".to_string())]),
            Metadata::new(),
            vec![normalized("one")],
        );
        store.append(
            "ds",
            Tags::from([("env".to_string(), "staging".to_string())]),
            Metadata::new(),
            vec![normalized("two")],
        );

        let handle = store.get("ds").unwrap();
        let dataset = handle.read();
        assert_eq!(dataset.tags.get("env").unwrap(), "staging");
        assert_eq!(dataset.len(), 2);
    }
}
