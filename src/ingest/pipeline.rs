use rayon::prelude::*;
use std::sync::Arc;
use tracing::debug;

use crate::analysis::tokenizer::{StandardTokenizer, Tokenizer, WhitespaceTokenizer};
use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::core::types::{Metadata, Tags};
use crate::dataset::store::DatasetStore;
use crate::index::indexer::{IndexJob, IndexTicket, Indexer};
use crate::record::bulk::{BulkResponse, TextClassificationBulk, TokenClassificationBulk};
use crate::record::model::{NormalizedRecord, TextClassificationRecord, TokenClassificationRecord};

/// Bulk ingestion: validate and normalize each record, append the accepted
/// ones atomically, hand the batch to the background indexer.
///
/// Per-record failures never abort the batch; they only raise the `failed`
/// counter in the response.
pub struct BulkPipeline {
    store: Arc<DatasetStore>,
    indexer: Arc<Indexer>,
    record_tokenizer: WhitespaceTokenizer,
    index_analyzer: StandardTokenizer,
    pool: rayon::ThreadPool,
    parallel_threshold: usize,
}

impl BulkPipeline {
    pub fn new(store: Arc<DatasetStore>, indexer: Arc<Indexer>, config: &Config) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.normalize_workers)
            .build()
            .map_err(|e| Error::Internal(format!("failed to build thread pool: {}", e)))?;

        Ok(BulkPipeline {
            store,
            indexer,
            record_tokenizer: WhitespaceTokenizer,
            index_analyzer: StandardTokenizer::default(),
            pool,
            parallel_threshold: config.parallel_batch_threshold.max(1),
        })
    }

    pub fn ingest_token_classification(
        &self,
        bulk: TokenClassificationBulk,
    ) -> Result<(BulkResponse, IndexTicket)> {
        let TokenClassificationBulk {
            name,
            tags,
            metadata,
            records,
        } = bulk;
        let tokenizer = &self.record_tokenizer;
        self.ingest(name, tags, metadata, records, |record: TokenClassificationRecord| {
            NormalizedRecord::from_tokens(record, tokenizer)
        })
    }

    pub fn ingest_text_classification(
        &self,
        bulk: TextClassificationBulk,
    ) -> Result<(BulkResponse, IndexTicket)> {
        let TextClassificationBulk {
            name,
            tags,
            metadata,
            records,
        } = bulk;
        let tokenizer = &self.record_tokenizer;
        self.ingest(name, tags, metadata, records, |record: TextClassificationRecord| {
            NormalizedRecord::from_text(record, tokenizer)
        })
    }

    fn ingest<R, F>(
        &self,
        name: String,
        tags: Tags,
        metadata: Metadata,
        records: Vec<R>,
        normalize: F,
    ) -> Result<(BulkResponse, IndexTicket)>
    where
        R: Send,
        F: Fn(R) -> Result<NormalizedRecord> + Sync,
    {
        if name.trim().is_empty() {
            return Err(Error::invalid_request("dataset name must not be empty"));
        }

        let submitted = records.len();
        let analyzer = &self.index_analyzer;
        let normalize_one = |record: R| -> Result<(NormalizedRecord, Vec<String>)> {
            let normalized = normalize(record)?;
            let terms = analyzer.token_texts(&normalized.raw_text);
            Ok((normalized, terms))
        };

        // In-batch order is preserved either way; rayon only pays off on
        // larger batches.
        let outcomes: Vec<Result<(NormalizedRecord, Vec<String>)>> =
            if submitted >= self.parallel_threshold {
                self.pool.install(|| {
                    records.into_par_iter().map(normalize_one).collect()
                })
            } else {
                records.into_iter().map(normalize_one).collect()
            };

        let mut staged = Vec::with_capacity(submitted);
        let mut terms = Vec::with_capacity(submitted);
        let mut failed = 0usize;
        for outcome in outcomes {
            match outcome {
                Ok((record, record_terms)) => {
                    staged.push(record);
                    terms.push(record_terms);
                }
                Err(error) => {
                    debug!(dataset = %name, %error, "record rejected");
                    failed += 1;
                }
            }
        }

        let processed = staged.len();
        // The dataset row is created even when every record was rejected
        let (dataset_id, ids) = self.store.append(&name, tags, metadata, staged);

        let ticket = self.indexer.submit(IndexJob {
            dataset: name.clone(),
            dataset_id,
            entries: ids.into_iter().zip(terms).collect(),
        })?;

        debug!(
            dataset = %name,
            processed,
            failed,
            "bulk batch ingested"
        );

        Ok((
            BulkResponse {
                dataset: name,
                processed,
                failed,
            },
            ticket,
        ))
    }
}
