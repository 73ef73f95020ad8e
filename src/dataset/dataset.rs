use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use uuid::Uuid;

use crate::core::types::{Metadata, RecordId, Tags, TaskKind};
use crate::record::model::{NormalizedRecord, StoredRecord};

/// A named, insertion-ordered collection of normalized records.
///
/// The `id` changes every time a dataset name is deleted and re-created; the
/// index registry uses it to tell a fresh dataset apart from stale index
/// state left over from a previous incarnation of the same name.
#[derive(Debug)]
pub struct Dataset {
    pub id: Uuid,
    pub name: String,
    pub tags: Tags,
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,

    records: Vec<StoredRecord>,
    next_seq: u64,
}

impl Dataset {
    pub fn new(name: String, tags: Tags, metadata: Metadata) -> Self {
        let now = Utc::now();
        Dataset {
            id: Uuid::new_v4(),
            name,
            tags,
            metadata,
            created_at: now,
            last_updated: now,
            records: Vec::new(),
            next_seq: 1,
        }
    }

    /// Overwrite dataset-level attributes, last writer wins. Stored records
    /// are untouched.
    pub fn update_attributes(&mut self, tags: Tags, metadata: Metadata) {
        for (key, value) in tags {
            self.tags.insert(key, value);
        }
        for (key, value) in metadata {
            self.metadata.insert(key, value);
        }
        self.last_updated = Utc::now();
    }

    /// Append records in batch order, assigning monotonically increasing ids.
    pub fn append(&mut self, records: Vec<NormalizedRecord>) -> Vec<RecordId> {
        let mut assigned = Vec::with_capacity(records.len());
        for record in records {
            let id = RecordId::new(self.next_seq);
            self.next_seq += 1;
            self.records.push(StoredRecord::from_normalized(id, record));
            assigned.push(id);
        }
        if !assigned.is_empty() {
            self.last_updated = Utc::now();
        }
        assigned
    }

    pub fn get(&self, id: RecordId) -> Option<&StoredRecord> {
        // Ids are assigned 1..=len in insertion order
        let index = id.value().checked_sub(1)? as usize;
        self.records.get(index).filter(|r| r.id == id)
    }

    pub fn records(&self) -> &[StoredRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> DatasetStats {
        let text_records = self
            .records
            .iter()
            .filter(|r| r.kind == TaskKind::TextClassification)
            .count();
        DatasetStats {
            total_records: self.records.len(),
            text_records,
            token_records: self.records.len() - text_records,
        }
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            id: self.id,
            name: self.name.clone(),
            tags: self.tags.clone(),
            metadata: self.metadata.clone(),
            created_at: self.created_at,
            last_updated: self.last_updated,
            records: self.records.len(),
        }
    }
}

/// Per-kind record counts for one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetStats {
    pub total_records: usize,
    pub text_records: usize,
    pub token_records: usize,
}

/// Dataset-level attributes plus record count, for listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub id: Uuid,
    pub name: String,
    pub tags: Tags,
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub records: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tokenizer::{Tokenizer, WhitespaceTokenizer};
    use crate::record::model::TokenClassificationRecord;

    fn normalized(text: &str) -> NormalizedRecord {
        let record = TokenClassificationRecord {
            tokens: vec![],
            raw_text: Some(text.to_string()),
            metadata: Metadata::new(),
            event_timestamp: None,
        };
        let tokenizer: Box<dyn Tokenizer> = Box::new(WhitespaceTokenizer);
        NormalizedRecord::from_tokens(record, tokenizer.as_ref()).unwrap()
    }

    #[test]
    fn append_assigns_monotonic_ids_in_batch_order() {
        let mut dataset = Dataset::new("ds".to_string(), Tags::new(), Metadata::new());
        let ids = dataset.append(vec![normalized("one"), normalized("two")]);
        assert_eq!(ids, vec![RecordId(1), RecordId(2)]);

        let ids = dataset.append(vec![normalized("three")]);
        assert_eq!(ids, vec![RecordId(3)]);
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.get(RecordId(3)).unwrap().raw_text, "three");
        assert!(dataset.get(RecordId(4)).is_none());
    }

    #[test]
    fn update_attributes_is_last_writer_wins() {
        let mut dataset = Dataset::new(
            "ds".to_string(),
            Tags::from([("env".to_string(), "test".to_string())]),
            Metadata::new(),
        );
        dataset.append(vec![normalized("kept")]);

        dataset.update_attributes(
            Tags::from([("env".to_string(), "prod".to_string())]),
            Metadata::from([("config".to_string(), serde_json::json!({"the": "config"}))]),
        );

        assert_eq!(dataset.tags.get("env").unwrap(), "prod");
        assert!(dataset.metadata.contains_key("config"));
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn stats_count_per_kind() {
        let mut dataset = Dataset::new("ds".to_string(), Tags::new(), Metadata::new());
        dataset.append(vec![normalized("a"), normalized("b")]);
        let stats = dataset.stats();
        assert_eq!(stats.total_records, 2);
        assert_eq!(stats.token_records, 2);
        assert_eq!(stats.text_records, 0);
    }
}
