// src/server/executor.rs

//! Pluggable job executor abstraction.
//!
//! Workers hand each dispatched job to a `JobExecutor`. Production uses
//! [`LifecycleExecutor`], which runs the real phases; tests can substitute an
//! executor that records what it was given without spawning processes.

use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use crate::errors::Result;
use crate::job::{LocatedJob, Lifecycle};
use crate::store::JobStore;

/// Trait abstracting how a dispatched job is executed.
pub trait JobExecutor: Send + Sync {
    fn execute<'a>(
        &'a self,
        job: LocatedJob,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// Runs build (optionally), init and run through [`Lifecycle`].
#[derive(Debug, Clone)]
pub struct LifecycleExecutor {
    store: JobStore,
    build: bool,
}

impl LifecycleExecutor {
    pub fn new(store: JobStore, build: bool) -> Self {
        Self { store, build }
    }
}

impl JobExecutor for LifecycleExecutor {
    fn execute<'a>(
        &'a self,
        job: LocatedJob,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let mut lifecycle = Lifecycle::new(&job, &self.store);
            lifecycle.execute(self.build, cancel).await
        })
    }
}
