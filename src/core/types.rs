use serde::{Serialize, Deserialize};
use std::collections::HashMap;

/// Sequence id of a record, scoped to its dataset.
///
/// Ids are assigned by the dataset on append and grow monotonically, so the
/// id order is the insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub u64);

impl RecordId {
    pub fn new(id: u64) -> Self {
        RecordId(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Classification task a record was ingested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    TextClassification,
    TokenClassification,
}

/// Dataset- and record-level tags: plain string to string.
pub type Tags = HashMap<String, String>;

/// Metadata values are arbitrary JSON (scalar or nested).
pub type Metadata = HashMap<String, serde_json::Value>;
