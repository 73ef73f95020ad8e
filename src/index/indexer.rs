use crossbeam::channel::{bounded, Sender, Receiver};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::error::{Error, Result};
use crate::core::types::RecordId;
use crate::dataset::store::DatasetStore;
use crate::index::registry::IndexRegistry;

/// One batch of records to make searchable, with index terms precomputed by
/// the ingestion pipeline.
pub struct IndexJob {
    pub dataset: String,
    pub dataset_id: Uuid,
    pub entries: Vec<(RecordId, Vec<String>)>,
}

/// Handle returned by `submit`; `wait_for` blocks until the job is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct IndexTicket(u64);

struct Watermark {
    applied: Mutex<u64>,
    cond: Condvar,
}

/// Background indexer: ingestion stays fast and search visibility is
/// eventually consistent within a bounded delay.
///
/// A single worker thread drains the job channel in submission order, so the
/// applied watermark moves monotonically and per-dataset index order matches
/// append order. Instead of sleeping, callers await a ticket.
pub struct Indexer {
    sender: Option<Sender<(u64, IndexJob)>>,
    worker: Option<thread::JoinHandle<()>>,
    watermark: Arc<Watermark>,
    /// Guards seq assignment AND the channel send, so jobs enter the queue
    /// in ticket order and the applied watermark stays monotonic.
    submitted: Mutex<u64>,
}

impl Indexer {
    pub fn start(
        registry: Arc<IndexRegistry>,
        store: Arc<DatasetStore>,
        queue_capacity: usize,
    ) -> Self {
        let (sender, receiver) = bounded(queue_capacity);
        let watermark = Arc::new(Watermark {
            applied: Mutex::new(0),
            cond: Condvar::new(),
        });

        let worker_watermark = watermark.clone();
        let worker = thread::spawn(move || {
            Self::index_worker(receiver, registry, store, worker_watermark);
        });

        Indexer {
            sender: Some(sender),
            worker: Some(worker),
            watermark,
            submitted: Mutex::new(0),
        }
    }

    fn index_worker(
        receiver: Receiver<(u64, IndexJob)>,
        registry: Arc<IndexRegistry>,
        store: Arc<DatasetStore>,
        watermark: Arc<Watermark>,
    ) {
        while let Ok((seq, job)) = receiver.recv() {
            // A job is only applied while its incarnation is the live one in
            // the store. A batch whose dataset was deleted (or deleted and
            // re-created) in the meantime is dropped: applying it would
            // resurrect a registry entry for a gone dataset, or clobber the
            // newer incarnation's index with stale state. A job for the
            // current incarnation can never overtake it here, because the
            // incarnation exists in the store before any of its jobs are
            // queued.
            let live = store.get(&job.dataset).map(|handle| handle.read().id);
            if live == Some(job.dataset_id) {
                let index = registry.get_or_create(&job.dataset, job.dataset_id);
                {
                    let mut index = index.write();
                    for (id, terms) in &job.entries {
                        index.add_record(*id, terms);
                    }
                }
                debug!(
                    dataset = %job.dataset,
                    records = job.entries.len(),
                    "index job applied"
                );
            } else {
                debug!(
                    dataset = %job.dataset,
                    records = job.entries.len(),
                    "index job dropped, dataset incarnation is gone"
                );
            }

            let mut applied = watermark.applied.lock();
            *applied = seq;
            watermark.cond.notify_all();
        }
    }

    /// Queue a job for the background worker. Blocks if the queue is full.
    pub fn submit(&self, job: IndexJob) -> Result<IndexTicket> {
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| Error::Internal("indexer is shut down".to_string()))?;

        let mut submitted = self.submitted.lock();
        let seq = *submitted + 1;
        sender
            .send((seq, job))
            .map_err(|_| Error::Internal("indexer worker is gone".to_string()))?;
        *submitted = seq;
        Ok(IndexTicket(seq))
    }

    /// Block until the given job has been applied to its index.
    pub fn wait_for(&self, ticket: IndexTicket, timeout: Duration) -> Result<()> {
        let mut applied = self.watermark.applied.lock();
        while *applied < ticket.0 {
            if self
                .watermark
                .cond
                .wait_for(&mut applied, timeout)
                .timed_out()
            {
                warn!(ticket = ticket.0, applied = *applied, "index wait timed out");
                return Err(Error::Internal(format!(
                    "indexing did not catch up within {:?}",
                    timeout
                )));
            }
        }
        Ok(())
    }

    /// Block until every job submitted so far has been applied.
    pub fn refresh(&self, timeout: Duration) -> Result<()> {
        let submitted = *self.submitted.lock();
        if submitted == 0 {
            return Ok(());
        }
        self.wait_for(IndexTicket(submitted), timeout)
    }
}

impl Drop for Indexer {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Metadata, Tags};

    fn setup() -> (Arc<IndexRegistry>, Arc<DatasetStore>, Indexer) {
        let registry = Arc::new(IndexRegistry::new());
        let store = Arc::new(DatasetStore::new());
        let indexer = Indexer::start(registry.clone(), store.clone(), 16);
        (registry, store, indexer)
    }

    fn live_dataset(store: &DatasetStore, name: &str) -> Uuid {
        store
            .create_or_get(name, Tags::new(), Metadata::new())
            .read()
            .id
    }

    fn job(name: &str, dataset_id: Uuid, ids: &[u64]) -> IndexJob {
        IndexJob {
            dataset: name.to_string(),
            dataset_id,
            entries: ids
                .iter()
                .map(|id| (RecordId(*id), vec![format!("term{}", id)]))
                .collect(),
        }
    }

    #[test]
    fn submitted_jobs_become_visible_after_wait() {
        let (registry, store, indexer) = setup();
        let dataset_id = live_dataset(&store, "ds");

        let ticket = indexer.submit(job("ds", dataset_id, &[1, 2])).unwrap();
        indexer
            .wait_for(ticket, Duration::from_secs(5))
            .unwrap();

        let index = registry.get("ds", dataset_id).unwrap();
        assert_eq!(index.read().doc_count(), 2);
    }

    #[test]
    fn refresh_waits_for_all_submitted_jobs() {
        let (registry, store, indexer) = setup();
        let dataset_id = live_dataset(&store, "ds");

        for batch in [&[1u64, 2][..], &[3][..]] {
            indexer.submit(job("ds", dataset_id, batch)).unwrap();
        }
        indexer.refresh(Duration::from_secs(5)).unwrap();

        let index = registry.get("ds", dataset_id).unwrap();
        assert_eq!(index.read().doc_count(), 3);
    }

    #[test]
    fn refresh_without_jobs_returns_immediately() {
        let (_, _, indexer) = setup();
        indexer.refresh(Duration::from_millis(10)).unwrap();
    }

    #[test]
    fn job_for_an_old_incarnation_never_clobbers_the_live_index() {
        let (registry, store, indexer) = setup();
        let live = live_dataset(&store, "ds");
        let old = Uuid::new_v4();

        // The live incarnation's batch lands first
        let ticket = indexer.submit(job("ds", live, &[1])).unwrap();
        indexer.wait_for(ticket, Duration::from_secs(5)).unwrap();
        assert_eq!(registry.get("ds", live).unwrap().read().doc_count(), 1);

        // A batch from a previous, deleted incarnation arrives late
        let ticket = indexer.submit(job("ds", old, &[1, 2])).unwrap();
        indexer.wait_for(ticket, Duration::from_secs(5)).unwrap();

        let index = registry
            .get("ds", live)
            .expect("stale job must not replace the live incarnation's index");
        assert_eq!(index.read().doc_count(), 1);
        assert_eq!(index.read().visible(), &[RecordId(1)]);
        assert!(registry.get("ds", old).is_none());
    }

    #[test]
    fn job_for_a_deleted_dataset_leaves_no_registry_entry() {
        let (registry, store, indexer) = setup();
        let dataset_id = live_dataset(&store, "gone");
        store.delete("gone");

        let ticket = indexer.submit(job("gone", dataset_id, &[1])).unwrap();
        indexer.wait_for(ticket, Duration::from_secs(5)).unwrap();

        assert!(registry.get("gone", dataset_id).is_none());
    }
}
