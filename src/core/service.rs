use std::sync::Arc;
use tracing::info;

use crate::core::config::Config;
use crate::core::error::Result;
use crate::dataset::dataset::{DatasetStats, DatasetSummary};
use crate::dataset::store::DatasetStore;
use crate::index::indexer::{IndexTicket, Indexer};
use crate::index::registry::IndexRegistry;
use crate::ingest::pipeline::BulkPipeline;
use crate::query::types::SearchQuery;
use crate::record::bulk::{BulkResponse, TextClassificationBulk, TokenClassificationBulk};
use crate::record::model::{StoredRecord, TextClassificationView, TokenClassificationView};
use crate::search::executor::QueryExecutor;
use crate::search::results::SearchResults;

/// Top-level facade tying store, pipeline, indexer and query engine together.
///
/// Methods map one-to-one onto the external endpoints; the HTTP routing layer
/// is expected to deserialize request bodies and call straight through.
pub struct DatasetService {
    store: Arc<DatasetStore>,
    indexes: Arc<IndexRegistry>,
    indexer: Arc<Indexer>,
    pipeline: BulkPipeline,
    executor: QueryExecutor,
    config: Config,
}

impl DatasetService {
    pub fn new(config: Config) -> Result<Self> {
        let store = Arc::new(DatasetStore::new());
        let indexes = Arc::new(IndexRegistry::new());
        let indexer = Arc::new(Indexer::start(
            indexes.clone(),
            store.clone(),
            config.indexer_queue_capacity,
        ));
        let pipeline = BulkPipeline::new(store.clone(), indexer.clone(), &config)?;
        let executor = QueryExecutor::new(config.default_page_size, config.max_page_size);

        Ok(DatasetService {
            store,
            indexes,
            indexer,
            pipeline,
            executor,
            config,
        })
    }

    pub fn with_defaults() -> Result<Self> {
        DatasetService::new(Config::default())
    }

    /// Delete a dataset, its records and its index. Idempotent: deleting an
    /// absent dataset succeeds.
    pub fn delete_dataset(&self, name: &str) -> Result<()> {
        let existed = self.store.delete(name);
        self.indexes.delete(name);
        if existed {
            info!(dataset = name, "dataset removed");
        }
        Ok(())
    }

    pub fn ingest_token_classification(
        &self,
        bulk: TokenClassificationBulk,
    ) -> Result<BulkResponse> {
        let (response, _) = self.pipeline.ingest_token_classification(bulk)?;
        Ok(response)
    }

    pub fn ingest_text_classification(&self, bulk: TextClassificationBulk) -> Result<BulkResponse> {
        let (response, _) = self.pipeline.ingest_text_classification(bulk)?;
        Ok(response)
    }

    /// Same as the plain ingest calls, but hands back the index ticket so the
    /// caller can await visibility of exactly this batch.
    pub fn ingest_token_classification_tracked(
        &self,
        bulk: TokenClassificationBulk,
    ) -> Result<(BulkResponse, IndexTicket)> {
        self.pipeline.ingest_token_classification(bulk)
    }

    pub fn ingest_text_classification_tracked(
        &self,
        bulk: TextClassificationBulk,
    ) -> Result<(BulkResponse, IndexTicket)> {
        self.pipeline.ingest_text_classification(bulk)
    }

    /// Search through the token-classification view. Works on any dataset
    /// regardless of the kind its records were ingested as.
    pub fn search_token_classification(
        &self,
        name: &str,
        query: &SearchQuery,
    ) -> Result<SearchResults<TokenClassificationView>> {
        self.search(name, query)
    }

    /// Search through the text-classification view.
    pub fn search_text_classification(
        &self,
        name: &str,
        query: &SearchQuery,
    ) -> Result<SearchResults<TextClassificationView>> {
        self.search(name, query)
    }

    fn search<V>(&self, name: &str, query: &SearchQuery) -> Result<SearchResults<V>>
    where
        V: for<'a> From<&'a StoredRecord>,
    {
        let Some(handle) = self.store.get(name) else {
            // Absent dataset: empty results, never an error
            return Ok(SearchResults::empty());
        };
        let dataset = handle.read();

        let Some(index) = self.indexes.get(name, dataset.id) else {
            // Nothing indexed yet for this incarnation
            return Ok(SearchResults::empty());
        };
        let index = index.read();

        let (total, ids) = self.executor.execute(&dataset, &index, query);
        let records = ids
            .into_iter()
            .filter_map(|id| dataset.get(id))
            .map(V::from)
            .collect();

        Ok(SearchResults { total, records })
    }

    pub fn list_datasets(&self) -> Vec<DatasetSummary> {
        self.store.list()
    }

    pub fn dataset_stats(&self, name: &str) -> Result<DatasetStats> {
        self.store.stats(name)
    }

    /// Block until every bulk write submitted so far is searchable.
    ///
    /// This replaces fixed sleeps: near-real-time indexing stays asynchronous
    /// but callers get an explicit completion signal.
    pub fn refresh(&self) -> Result<()> {
        self.indexer.refresh(self.config.visibility_timeout())
    }

    /// Block until one specific batch is searchable.
    pub fn await_indexed(&self, ticket: IndexTicket) -> Result<()> {
        self.indexer
            .wait_for(ticket, self.config.visibility_timeout())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
