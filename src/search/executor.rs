use crate::analysis::tokenizer::{StandardTokenizer, Tokenizer};
use crate::core::types::RecordId;
use crate::dataset::dataset::Dataset;
use crate::index::inverted::InvertedIndex;
use crate::query::types::SearchQuery;

/// Stateless query execution over one dataset's index.
///
/// Only indexed records are considered, so search visibility follows the
/// indexer watermark, not the store contents.
pub struct QueryExecutor {
    analyzer: StandardTokenizer,
    default_page_size: usize,
    max_page_size: usize,
}

impl QueryExecutor {
    pub fn new(default_page_size: usize, max_page_size: usize) -> Self {
        QueryExecutor {
            analyzer: StandardTokenizer::default(),
            default_page_size,
            max_page_size,
        }
    }

    /// Matching ids: full count plus one page, ordered by record id.
    pub fn execute(
        &self,
        dataset: &Dataset,
        index: &InvertedIndex,
        query: &SearchQuery,
    ) -> (usize, Vec<RecordId>) {
        let mut matches = if query.has_text() {
            let terms = self
                .analyzer
                .tokenize(query.query.as_deref().unwrap_or_default());
            self.match_terms(index, &terms.into_iter().map(|t| t.text).collect::<Vec<_>>())
        } else {
            index.visible().to_vec()
        };

        if query.has_filters() {
            if let Some(filters) = &query.metadata {
                matches.retain(|id| {
                    dataset
                        .get(*id)
                        .map(|record| {
                            filters
                                .iter()
                                .all(|(key, value)| record.metadata.get(key) == Some(value))
                        })
                        .unwrap_or(false)
                });
            }
        }

        let total = matches.len();
        let limit = query
            .limit
            .unwrap_or(self.default_page_size)
            .min(self.max_page_size);
        let page = matches
            .into_iter()
            .skip(query.from)
            .take(limit)
            .collect();

        (total, page)
    }

    /// Conjunctive term matching over sorted posting lists.
    fn match_terms(&self, index: &InvertedIndex, terms: &[String]) -> Vec<RecordId> {
        if terms.is_empty() {
            return index.visible().to_vec();
        }

        let mut postings: Vec<&[RecordId]> = Vec::with_capacity(terms.len());
        for term in terms {
            match index.postings(term) {
                Some(ids) => postings.push(ids),
                None => return Vec::new(),
            }
        }

        // Start from the rarest term to keep intersections small
        postings.sort_by_key(|ids| ids.len());
        let mut result = postings[0].to_vec();
        for ids in &postings[1..] {
            result = intersect_sorted(&result, ids);
            if result.is_empty() {
                break;
            }
        }
        result
    }
}

/// Intersection of two id lists sorted ascending.
fn intersect_sorted(left: &[RecordId], right: &[RecordId]) -> Vec<RecordId> {
    let mut result = Vec::with_capacity(left.len().min(right.len()));
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        match left[i].cmp(&right[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                result.push(left[i]);
                i += 1;
                j += 1;
            }
        }
    }
    result
}
