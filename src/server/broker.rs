// src/server/broker.rs

//! Pairs idle workers with queued jobs.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::job::LocatedJob;
use crate::server::queue::JobQueue;
use crate::store::JobStore;

/// An idle worker's request for its next job.
pub type JobRequest = oneshot::Sender<LocatedJob>;

/// Single control loop owning the queue file and the list of idle workers.
///
/// Requests are kept in arrival order and jobs are taken from the head of
/// the queue, so the worker that asked first gets the oldest job. At most
/// one job is dispatched per tick.
#[derive(Debug)]
pub struct Broker {
    store: JobStore,
    queue: JobQueue,
    tick: Duration,
    requests: mpsc::Receiver<JobRequest>,
    pending: VecDeque<JobRequest>,
}

impl Broker {
    pub fn new(
        store: JobStore,
        queue: JobQueue,
        tick: Duration,
        requests: mpsc::Receiver<JobRequest>,
    ) -> Self {
        Self {
            store,
            queue,
            tick,
            requests,
            pending: VecDeque::new(),
        }
    }

    /// Run until `cancel` fires or every worker has gone away.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(queue = %self.queue.path().display(), tick = ?self.tick, "broker started");

        let mut ticker = tokio::time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    debug!("broker observed shutdown");
                    break;
                }

                request = self.requests.recv() => match request {
                    Some(request) => {
                        self.pending.push_back(request);
                        debug!(pending = self.pending.len(), "worker registered");
                    }
                    None => {
                        info!("no workers left; broker exiting");
                        break;
                    }
                },

                _ = ticker.tick() => self.on_tick(),
            }
        }

        info!("broker stopped");
    }

    /// One polling step: hand the head of the queue to the oldest request.
    pub fn on_tick(&mut self) {
        // Workers that stopped waiting have dropped their receiver.
        self.pending.retain(|request| !request.is_closed());
        if self.pending.is_empty() {
            return;
        }

        let identifier = match self.queue.dequeue() {
            Ok(Some(identifier)) => identifier,
            Ok(None) => return,
            Err(e) => {
                error!(
                    queue = %self.queue.path().display(),
                    error = %e,
                    "can't read queue; treating as empty"
                );
                return;
            }
        };

        let job = match self.store.load(&identifier) {
            Ok(job) => job,
            Err(e) => {
                error!(job = %identifier, error = %e, "can't load queued job; skipping it");
                return;
            }
        };

        self.dispatch(job);
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn dispatch(&mut self, mut job: LocatedJob) {
        let id = self.store.normalize_identifier(job.dir());
        while let Some(request) = self.pending.pop_front() {
            match request.send(job) {
                Ok(()) => {
                    info!(job = %id, pending = self.pending.len(), "job dispatched");
                    return;
                }
                Err(returned) => {
                    debug!("worker went away before dispatch; trying the next one");
                    job = returned;
                }
            }
        }

        warn!(job = %id, "no idle worker left to take the job; it was dropped");
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::job::JobSpec;

    fn setup(n_jobs: usize) -> (tempfile::TempDir, JobStore, JobQueue, Vec<String>) {
        let root = tempfile::tempdir().unwrap();
        let store = JobStore::new(root.path()).unwrap();
        let mut ids = Vec::new();
        for i in 0..n_jobs {
            let job = store.locate_fresh(JobSpec::define(
                format!("echo {i}"),
                "true",
                "true",
                "rev",
                vec![],
            ));
            store.persist(&job).unwrap();
            ids.push(store.normalize_identifier(job.dir()));
        }
        let queue_path = root.path().join("queue");
        fs::write(&queue_path, ids.join("\n")).unwrap();
        (root, store, JobQueue::new(queue_path), ids)
    }

    fn broker(store: JobStore, queue: JobQueue) -> (Broker, mpsc::Sender<JobRequest>) {
        let (tx, rx) = mpsc::channel(8);
        (Broker::new(store, queue, Duration::from_millis(10), rx), tx)
    }

    #[test]
    fn tick_without_requests_leaves_queue_alone() {
        let (root, store, queue, ids) = setup(1);
        let (mut broker, _tx) = broker(store, queue);

        broker.on_tick();

        let remaining = fs::read_to_string(root.path().join("queue")).unwrap();
        assert_eq!(remaining.trim(), ids[0]);
    }

    #[test]
    fn earliest_request_gets_head_of_queue() {
        let (_root, store, queue, ids) = setup(2);
        let (mut broker, _tx) = broker(store.clone(), queue);

        let (first_tx, mut first_rx) = oneshot::channel();
        let (second_tx, mut second_rx) = oneshot::channel();
        broker.pending.push_back(first_tx);
        broker.pending.push_back(second_tx);

        broker.on_tick();
        let got = first_rx.try_recv().unwrap();
        assert_eq!(store.normalize_identifier(got.dir()), ids[0]);
        assert!(second_rx.try_recv().is_err());
        assert_eq!(broker.pending_len(), 1);

        broker.on_tick();
        let got = second_rx.try_recv().unwrap();
        assert_eq!(store.normalize_identifier(got.dir()), ids[1]);
        assert_eq!(broker.pending_len(), 0);
    }

    #[test]
    fn abandoned_request_is_skipped() {
        let (_root, store, queue, ids) = setup(1);
        let (mut broker, _tx) = broker(store.clone(), queue);

        let (gone_tx, gone_rx) = oneshot::channel();
        let (live_tx, mut live_rx) = oneshot::channel();
        drop(gone_rx);
        broker.pending.push_back(gone_tx);
        broker.pending.push_back(live_tx);

        broker.on_tick();

        let got = live_rx.try_recv().unwrap();
        assert_eq!(store.normalize_identifier(got.dir()), ids[0]);
    }

    #[test]
    fn unloadable_job_is_consumed_and_skipped() {
        let (root, store, queue, _ids) = setup(0);
        fs::write(root.path().join("queue"), "no/such/job\n").unwrap();
        let (mut broker, _tx) = broker(store, queue);

        let (req_tx, mut req_rx) = oneshot::channel();
        broker.pending.push_back(req_tx);
        broker.on_tick();

        assert!(req_rx.try_recv().is_err());
        assert_eq!(broker.pending_len(), 1);
        assert_eq!(fs::read_to_string(root.path().join("queue")).unwrap(), "");
    }
}
