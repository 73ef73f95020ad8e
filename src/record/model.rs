use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use std::collections::HashMap;

use crate::analysis::tokenizer::Tokenizer;
use crate::core::error::{Error, Result};
use crate::core::types::{Metadata, RecordId, TaskKind};

/// Input record for the text classification task, as handed over by the
/// routing layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextClassificationRecord {
    /// Field name to text content. At least one non-empty entry required.
    pub text: HashMap<String, String>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub event_timestamp: Option<DateTime<Utc>>,
}

/// Input record for the token classification task.
///
/// `tokens` and `raw_text` may each be omitted; the missing side is derived
/// from the other during normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClassificationRecord {
    #[serde(default)]
    pub tokens: Vec<String>,
    #[serde(default)]
    pub raw_text: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub event_timestamp: Option<DateTime<Utc>>,
}

/// Normalized superset representation shared by both kinds.
///
/// Every record, regardless of the endpoint it came in through, carries
/// non-empty `tokens` and `raw_text`. Kind-specific search endpoints are
/// projections over this one shape, which is what makes a text-classification
/// write visible through the token-classification view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub kind: TaskKind,
    pub raw_text: String,
    pub tokens: Vec<String>,
    /// Original text fields; empty for token-origin records.
    pub text_fields: HashMap<String, String>,
    pub metadata: Metadata,
    pub event_timestamp: Option<DateTime<Utc>>,
}

/// A record after the dataset assigned its sequence id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: RecordId,
    pub kind: TaskKind,
    pub raw_text: String,
    pub tokens: Vec<String>,
    pub text_fields: HashMap<String, String>,
    pub metadata: Metadata,
    pub event_timestamp: Option<DateTime<Utc>>,
}

impl StoredRecord {
    pub fn from_normalized(id: RecordId, record: NormalizedRecord) -> Self {
        StoredRecord {
            id,
            kind: record.kind,
            raw_text: record.raw_text,
            tokens: record.tokens,
            text_fields: record.text_fields,
            metadata: record.metadata,
            event_timestamp: record.event_timestamp,
        }
    }
}

impl NormalizedRecord {
    /// Validate and normalize a text classification record.
    ///
    /// `raw_text` is the text fields joined in key order; `tokens` come from
    /// the default tokenizer so the record also answers token-classification
    /// queries.
    pub fn from_text(record: TextClassificationRecord, tokenizer: &dyn Tokenizer) -> Result<Self> {
        if record.text.is_empty() {
            return Err(Error::validation("text record has no text fields"));
        }

        let mut fields: Vec<(&String, &String)> = record.text.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));
        let raw_text = fields
            .iter()
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if raw_text.is_empty() {
            return Err(Error::validation("text record fields are all empty"));
        }

        let tokens = tokenizer.token_texts(&raw_text);
        if tokens.is_empty() {
            return Err(Error::validation("text record produced no tokens"));
        }

        Ok(NormalizedRecord {
            kind: TaskKind::TextClassification,
            raw_text,
            tokens,
            text_fields: record.text,
            metadata: record.metadata,
            event_timestamp: record.event_timestamp,
        })
    }

    /// Validate and normalize a token classification record.
    pub fn from_tokens(
        record: TokenClassificationRecord,
        tokenizer: &dyn Tokenizer,
    ) -> Result<Self> {
        let supplied_tokens: Vec<String> = record
            .tokens
            .into_iter()
            .filter(|t| !t.trim().is_empty())
            .collect();

        let (raw_text, tokens) = if !supplied_tokens.is_empty() {
            // Custom tokens win; raw_text defaults to the single-space join.
            let raw_text = match record.raw_text {
                Some(text) if !text.trim().is_empty() => text,
                _ => supplied_tokens.join(" "),
            };
            (raw_text, supplied_tokens)
        } else {
            let raw_text = record
                .raw_text
                .filter(|text| !text.trim().is_empty())
                .ok_or_else(|| Error::validation("token record has neither tokens nor raw_text"))?;
            let tokens = tokenizer.token_texts(&raw_text);
            if tokens.is_empty() {
                return Err(Error::validation("raw_text produced no tokens"));
            }
            (raw_text, tokens)
        };

        Ok(NormalizedRecord {
            kind: TaskKind::TokenClassification,
            raw_text,
            tokens,
            text_fields: HashMap::new(),
            metadata: record.metadata,
            event_timestamp: record.event_timestamp,
        })
    }
}

/// Token-classification projection of a stored record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClassificationView {
    pub id: RecordId,
    pub tokens: Vec<String>,
    pub raw_text: String,
    pub metadata: Metadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_timestamp: Option<DateTime<Utc>>,
}

impl From<&StoredRecord> for TokenClassificationView {
    fn from(record: &StoredRecord) -> Self {
        TokenClassificationView {
            id: record.id,
            tokens: record.tokens.clone(),
            raw_text: record.raw_text.clone(),
            metadata: record.metadata.clone(),
            event_timestamp: record.event_timestamp,
        }
    }
}

/// Text-classification projection of a stored record.
///
/// Token-origin records carry no original text fields, so they project as a
/// single `text` field holding the raw text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextClassificationView {
    pub id: RecordId,
    pub text: HashMap<String, String>,
    pub metadata: Metadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_timestamp: Option<DateTime<Utc>>,
}

impl From<&StoredRecord> for TextClassificationView {
    fn from(record: &StoredRecord) -> Self {
        let text = if record.text_fields.is_empty() {
            HashMap::from([("text".to_string(), record.raw_text.clone())])
        } else {
            record.text_fields.clone()
        };
        TextClassificationView {
            id: record.id,
            text,
            metadata: record.metadata.clone(),
            event_timestamp: record.event_timestamp,
        }
    }
}
