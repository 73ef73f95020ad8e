use serde::{Serialize, Deserialize};

/// Search results container
///
/// `total` is the full matching count, independent of pagination; `records`
/// holds at most one page of projections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults<T> {
    pub total: usize,
    pub records: Vec<T>,
}

impl<T> SearchResults<T> {
    pub fn empty() -> Self {
        SearchResults {
            total: 0,
            records: Vec::new(),
        }
    }
}
