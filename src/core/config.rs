use serde::{Serialize, Deserialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Page size used when a search query does not ask for one.
    pub default_page_size: usize,
    /// Hard cap on requested page sizes.
    pub max_page_size: usize,

    /// Capacity of the bounded channel feeding the background indexer.
    pub indexer_queue_capacity: usize,
    /// Upper bound on how long `refresh()` waits for pending index jobs.
    pub visibility_timeout_ms: u64,

    /// Batches at least this large are normalized on the rayon pool.
    pub parallel_batch_threshold: usize,
    /// Worker threads for parallel normalization.
    pub normalize_workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_page_size: 50,
            max_page_size: 1000,
            indexer_queue_capacity: 1024,       // Buffered index jobs
            visibility_timeout_ms: 5000,        // Bounded read-after-write delay
            parallel_batch_threshold: 256,      // Small batches stay on the caller thread
            normalize_workers: num_cpus::get(),
        }
    }
}

impl Config {
    pub fn visibility_timeout(&self) -> Duration {
        Duration::from_millis(self.visibility_timeout_ms)
    }
}
