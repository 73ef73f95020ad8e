pub mod core;
pub mod analysis;
pub mod record;
pub mod dataset;
pub mod ingest;
pub mod index;
pub mod query;
pub mod search;

/*
┌──────────────────────────────────────────────────────────────────────────┐
│                        ANNODEX STRUCT ARCHITECTURE                        │
└──────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────── CORE LAYER ──────────────────────────────┐
│  ┌────────────────────────────────────────────────────────────────────┐ │
│  │                       struct DatasetService                         │ │
│  │  store: Arc<DatasetStore>        // name → dataset registry        │ │
│  │  indexes: Arc<IndexRegistry>     // name → inverted index          │ │
│  │  indexer: Arc<Indexer>           // background index worker        │ │
│  │  pipeline: BulkPipeline          // bulk validation + append       │ │
│  │  executor: QueryExecutor         // stateless query execution      │ │
│  │  config: Config                  // page sizes, timeouts, workers  │ │
│  └────────────────────────────────────────────────────────────────────┘ │
│                                                                          │
│  ┌──────────────────┐  ┌───────────────────┐  ┌───────────────────────┐ │
│  │ struct RecordId  │  │ enum TaskKind     │  │ enum Error            │ │
│  │ • 0: u64         │  │ • TextClass...    │  │ • Validation          │ │
│  └──────────────────┘  │ • TokenClass...   │  │ • DatasetNotFound     │ │
│                        └───────────────────┘  │ • InvalidRequest      │ │
│                                               │ • Internal            │ │
│                                               └───────────────────────┘ │
└──────────────────────────────────────────────────────────────────────────┘

┌─────────────────────────────── RECORD LAYER ─────────────────────────────┐
│  TextClassificationRecord ─┐                                             │
│                            ├─ normalize ─> NormalizedRecord              │
│  TokenClassificationRecord ┘   {kind, raw_text, tokens, text_fields,     │
│                                 metadata, event_timestamp}               │
│                                                                          │
│  StoredRecord = NormalizedRecord + RecordId (assigned by the dataset)    │
│  Projections: TokenClassificationView / TextClassificationView           │
└──────────────────────────────────────────────────────────────────────────┘

┌────────────────────────────── INGEST LAYER ──────────────────────────────┐
│  BulkPipeline ── normalizes per record (rayon on large batches),         │
│  appends accepted records to DatasetStore, submits IndexJob,             │
│  returns BulkResponse {dataset, processed, failed}                       │
└──────────────────────────────────────────────────────────────────────────┘

┌────────────────────────────── INDEX LAYER ───────────────────────────────┐
│  Indexer (single worker thread, crossbeam channel)                       │
│     │ applies IndexJob ──> InvertedIndex {postings, visible}             │
│     └ watermark + Condvar ──> IndexTicket / refresh()                    │
│  IndexRegistry keyed by dataset name, checked against incarnation Uuid   │
└──────────────────────────────────────────────────────────────────────────┘

┌────────────────────────────── SEARCH LAYER ──────────────────────────────┐
│  SearchQuery {query?, metadata?, from, limit}  ({} ⇒ match-all)          │
│  QueryExecutor ── conjunctive term match over sorted postings,           │
│  metadata filter, pagination ──> SearchResults {total, records}          │
└──────────────────────────────────────────────────────────────────────────┘

┌────────────────────────────── RELATIONSHIPS ─────────────────────────────┐
│  DatasetService ──owns──> BulkPipeline ──appends──> DatasetStore         │
│       │                        └──submits──> Indexer ──> InvertedIndex   │
│       └──owns──> QueryExecutor ──reads──> InvertedIndex + Dataset        │
│                                                                          │
│  Write visibility: append ──(async, bounded)──> index ──> searchable     │
└──────────────────────────────────────────────────────────────────────────┘
*/
