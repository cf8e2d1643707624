// src/server/worker.rs

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::job::LocatedJob;
use crate::server::broker::JobRequest;
use crate::server::executor::JobExecutor;
use crate::store::JobStore;

/// One member of the worker pool.
///
/// Loop: register a fresh request with the broker, wait for a job (or
/// shutdown), execute it, repeat. Job failures are logged and never stop the
/// worker.
pub struct Worker<E: JobExecutor> {
    id: usize,
    store: JobStore,
    executor: Arc<E>,
    requests: mpsc::Sender<JobRequest>,
}

impl<E: JobExecutor> Worker<E> {
    pub fn new(
        id: usize,
        store: JobStore,
        executor: Arc<E>,
        requests: mpsc::Sender<JobRequest>,
    ) -> Self {
        Self {
            id,
            store,
            executor,
            requests,
        }
    }

    pub async fn run(self, cancel: CancellationToken) {
        info!(worker = self.id, "worker started");

        loop {
            let (reply_tx, mut reply_rx) = oneshot::channel();

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                sent = self.requests.send(reply_tx) => {
                    if sent.is_err() {
                        debug!(worker = self.id, "broker gone; stopping");
                        break;
                    }
                }
            }

            let job = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    if let Some(job) = reclaim(&mut reply_rx) {
                        warn!(
                            worker = self.id,
                            job = %self.store.normalize_identifier(job.dir()),
                            "job arrived during shutdown and was not run; it is no longer queued"
                        );
                    }
                    break;
                }
                reply = &mut reply_rx => match reply {
                    Ok(job) => job,
                    Err(_) => {
                        debug!(worker = self.id, "broker dropped request; stopping");
                        break;
                    }
                },
            };

            let id = self.store.normalize_identifier(job.dir());
            info!(worker = self.id, job = %id, "job picked up");

            match self.executor.execute(job, &cancel).await {
                Ok(()) => info!(worker = self.id, job = %id, "job finished"),
                Err(e) if e.is_cancelled() => {
                    warn!(worker = self.id, job = %id, "job interrupted by shutdown")
                }
                Err(e) => error!(worker = self.id, job = %id, error = %e, "job failed"),
            }
        }

        info!(worker = self.id, "worker stopped");
    }
}

/// Close `reply` and take a job the broker already sent, if any.
///
/// Once closed, a later send fails and the broker keeps the job.
fn reclaim(reply: &mut oneshot::Receiver<LocatedJob>) -> Option<LocatedJob> {
    reply.close();
    reply.try_recv().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobSpec;

    fn job() -> LocatedJob {
        JobSpec::define("true", "true", "true", "rev", vec![]).locate("2024-01-01/00:00:00")
    }

    #[test]
    fn reclaim_takes_a_job_that_already_arrived() {
        let (tx, mut rx) = oneshot::channel();
        tx.send(job()).unwrap();

        let got = reclaim(&mut rx).expect("job was lost");
        assert_eq!(got.dir(), std::path::Path::new("2024-01-01/00:00:00"));
    }

    #[test]
    fn reclaim_refuses_later_jobs() {
        let (tx, mut rx) = oneshot::channel::<LocatedJob>();

        assert!(reclaim(&mut rx).is_none());
        let returned = tx.send(job()).expect_err("closed request accepted a job");
        assert_eq!(returned.spec().build_cmd, "true");
    }
}
