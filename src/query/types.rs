use serde::{Serialize, Deserialize};
use std::collections::HashMap;

/// Search query body. An empty object (`{}`) deserializes to match-all with
/// default pagination.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    /// Free-text query; every term must occur in a matching record.
    pub query: Option<String>,
    /// Exact-match filter on top-level record metadata keys.
    pub metadata: Option<HashMap<String, serde_json::Value>>,
    /// Pagination offset.
    pub from: usize,
    /// Page size; capped by the configured maximum.
    pub limit: Option<usize>,
}

impl SearchQuery {
    pub fn match_all() -> Self {
        SearchQuery::default()
    }

    pub fn has_text(&self) -> bool {
        self.query
            .as_deref()
            .map(|q| !q.trim().is_empty())
            .unwrap_or(false)
    }

    pub fn has_filters(&self) -> bool {
        self.metadata
            .as_ref()
            .map(|m| !m.is_empty())
            .unwrap_or(false)
    }
}
