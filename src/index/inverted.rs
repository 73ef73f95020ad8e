use std::collections::HashMap;
use uuid::Uuid;

use crate::core::types::RecordId;

/// Searchable view over one dataset incarnation.
///
/// Records are only present here once the background indexer applied their
/// batch, so this structure is also the visibility boundary: the store may
/// already hold a record whose id is not yet in `visible`.
pub struct InvertedIndex {
    /// Incarnation of the dataset this index was built for.
    pub dataset_id: Uuid,

    /// Term to sorted, deduplicated record ids.
    postings: HashMap<String, Vec<RecordId>>,
    /// All indexed record ids in index order.
    visible: Vec<RecordId>,
    total_tokens: usize,
}

impl InvertedIndex {
    pub fn new(dataset_id: Uuid) -> Self {
        InvertedIndex {
            dataset_id,
            postings: HashMap::new(),
            visible: Vec::new(),
            total_tokens: 0,
        }
    }

    /// Add one record's index terms. Concurrent batches to one dataset may
    /// reach the worker out of append order, so ids are kept sorted by
    /// insertion position rather than assumed ascending. Re-adding an id is
    /// a no-op.
    pub fn add_record(&mut self, id: RecordId, terms: &[String]) {
        if let Err(position) = self.visible.binary_search(&id) {
            self.visible.insert(position, id);
            self.total_tokens += terms.len();
        } else {
            return;
        }
        for term in terms {
            let postings = self.postings.entry(term.clone()).or_default();
            if let Err(position) = postings.binary_search(&id) {
                postings.insert(position, id);
            }
        }
    }

    pub fn postings(&self, term: &str) -> Option<&[RecordId]> {
        self.postings.get(term).map(|ids| ids.as_slice())
    }

    /// All indexed record ids, in index order.
    pub fn visible(&self) -> &[RecordId] {
        &self.visible
    }

    pub fn doc_count(&self) -> usize {
        self.visible.len()
    }

    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    pub fn total_tokens(&self) -> usize {
        self.total_tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn postings_stay_sorted_and_deduplicated() {
        let mut index = InvertedIndex::new(Uuid::new_v4());
        index.add_record(RecordId(1), &terms(&["this", "is", "this"]));
        index.add_record(RecordId(2), &terms(&["this", "text"]));

        assert_eq!(index.postings("this").unwrap(), &[RecordId(1), RecordId(2)]);
        assert_eq!(index.postings("text").unwrap(), &[RecordId(2)]);
        assert!(index.postings("missing").is_none());
        assert_eq!(index.doc_count(), 2);
        assert_eq!(index.visible(), &[RecordId(1), RecordId(2)]);
    }

    #[test]
    fn out_of_order_batches_still_index_sorted() {
        let mut index = InvertedIndex::new(Uuid::new_v4());
        index.add_record(RecordId(3), &terms(&["late"]));
        index.add_record(RecordId(1), &terms(&["early", "late"]));
        index.add_record(RecordId(1), &terms(&["early", "late"])); // replayed job

        assert_eq!(index.visible(), &[RecordId(1), RecordId(3)]);
        assert_eq!(index.postings("late").unwrap(), &[RecordId(1), RecordId(3)]);
        assert_eq!(index.doc_count(), 2);
        assert_eq!(index.total_tokens(), 3);
    }

    #[test]
    fn token_totals_accumulate() {
        let mut index = InvertedIndex::new(Uuid::new_v4());
        index.add_record(RecordId(1), &terms(&["a", "b"]));
        index.add_record(RecordId(2), &terms(&["c"]));
        assert_eq!(index.total_tokens(), 3);
        assert_eq!(index.term_count(), 3);
    }
}
