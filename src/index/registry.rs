use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::index::inverted::InvertedIndex;

/// Registry for per-dataset indexes, keyed by dataset name.
pub struct IndexRegistry {
    indexes: RwLock<HashMap<String, Arc<RwLock<InvertedIndex>>>>,
}

impl IndexRegistry {
    pub fn new() -> Self {
        IndexRegistry {
            indexes: RwLock::new(HashMap::new()),
        }
    }

    /// Index for the given dataset incarnation, creating it if absent.
    ///
    /// An index left over from a deleted dataset of the same name carries a
    /// different incarnation id and is replaced with a fresh one, so record
    /// ids from the old incarnation can never leak into the new one.
    pub fn get_or_create(&self, name: &str, dataset_id: Uuid) -> Arc<RwLock<InvertedIndex>> {
        {
            let indexes = self.indexes.read();
            if let Some(index) = indexes.get(name) {
                if index.read().dataset_id == dataset_id {
                    return index.clone();
                }
            }
        }

        let mut indexes = self.indexes.write();
        match indexes.get(name) {
            Some(index) if index.read().dataset_id == dataset_id => index.clone(),
            _ => {
                let index = Arc::new(RwLock::new(InvertedIndex::new(dataset_id)));
                indexes.insert(name.to_string(), index.clone());
                index
            }
        }
    }

    /// Index for the given incarnation, if one was built already.
    pub fn get(&self, name: &str, dataset_id: Uuid) -> Option<Arc<RwLock<InvertedIndex>>> {
        let indexes = self.indexes.read();
        indexes
            .get(name)
            .filter(|index| index.read().dataset_id == dataset_id)
            .cloned()
    }

    pub fn delete(&self, name: &str) -> bool {
        self.indexes.write().remove(name).is_some()
    }
}

impl Default for IndexRegistry {
    fn default() -> Self {
        IndexRegistry::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::RecordId;

    #[test]
    fn stale_incarnation_is_replaced() {
        let registry = IndexRegistry::new();
        let old_id = Uuid::new_v4();
        let new_id = Uuid::new_v4();

        let old = registry.get_or_create("ds", old_id);
        old.write()
            .add_record(RecordId(1), &["stale".to_string()]);

        assert!(registry.get("ds", new_id).is_none());
        let fresh = registry.get_or_create("ds", new_id);
        assert_eq!(fresh.read().doc_count(), 0);
        assert!(registry.get("ds", old_id).is_none());
    }

    #[test]
    fn delete_is_idempotent() {
        let registry = IndexRegistry::new();
        assert!(!registry.delete("missing"));
        registry.get_or_create("ds", Uuid::new_v4());
        assert!(registry.delete("ds"));
        assert!(!registry.delete("ds"));
    }
}
