use serde::{Serialize, Deserialize};

use crate::core::types::{Metadata, Tags};
use crate::record::model::{TextClassificationRecord, TokenClassificationRecord};

/// Bulk-write request for the token classification endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClassificationBulk {
    pub name: String,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub records: Vec<TokenClassificationRecord>,
}

/// Bulk-write request for the text classification endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextClassificationBulk {
    pub name: String,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub records: Vec<TextClassificationRecord>,
}

/// Outcome of one bulk-write call.
///
/// `processed + failed` always equals the number of submitted records; a bad
/// record never aborts the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkResponse {
    pub dataset: String,
    pub processed: usize,
    pub failed: usize,
}
