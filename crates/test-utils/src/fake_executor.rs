use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use simon::errors::{Result, SimonError};
use simon::job::LocatedJob;
use simon::server::JobExecutor;
use tokio_util::sync::CancellationToken;

/// What the fake executor saw, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Started(String),
    Finished(String),
    Cancelled(String),
}

/// A fake executor that:
/// - records when each job starts and stops (keyed by its build command)
/// - "runs" each job by sleeping for `hold`, unless cancelled first.
pub struct FakeExecutor {
    hold: Duration,
    events: Arc<Mutex<Vec<Event>>>,
}

impl FakeExecutor {
    pub fn new(hold: Duration) -> Self {
        Self {
            hold,
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Labels of finished jobs, in completion order.
    pub fn finished(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Finished(label) => Some(label),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl JobExecutor for FakeExecutor {
    fn execute<'a>(
        &'a self,
        job: LocatedJob,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let label = job.spec().build_cmd.clone();
            self.record(Event::Started(label.clone()));

            tokio::select! {
                _ = tokio::time::sleep(self.hold) => {
                    self.record(Event::Finished(label));
                    Ok(())
                }
                _ = cancel.cancelled() => {
                    self.record(Event::Cancelled(label));
                    Err(SimonError::Cancelled)
                }
            }
        })
    }
}
