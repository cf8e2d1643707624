// src/server/mod.rs

//! Long-lived scheduling server.
//!
//! Actors, all running on the Tokio runtime:
//! - the signal listener ([`shutdown`]), which turns Ctrl-C into cancellation
//! - the [`broker`], which polls the queue file and hands jobs to idle workers
//! - N [`worker`]s, which execute jobs through a [`JobExecutor`]
//!
//! They share nothing but the request channel and one `CancellationToken`.
//! [`serve`] returns once every actor has stopped.

pub mod broker;
pub mod executor;
pub mod queue;
pub mod shutdown;
pub mod worker;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::ServerConfig;
use crate::errors::Result;
use crate::store::JobStore;

pub use broker::{Broker, JobRequest};
pub use executor::{JobExecutor, LifecycleExecutor};
pub use queue::JobQueue;
pub use worker::Worker;

/// Run the server with the real phase executor until `cancel` fires (or
/// Ctrl-C is pressed).
pub async fn serve(config: ServerConfig, cancel: CancellationToken) -> Result<()> {
    let store = JobStore::new(&config.root)?;
    let executor = Arc::new(LifecycleExecutor::new(store, config.build));
    serve_with(config, executor, cancel).await
}

/// Like [`serve`], with a caller-supplied executor.
pub async fn serve_with<E>(
    config: ServerConfig,
    executor: Arc<E>,
    cancel: CancellationToken,
) -> Result<()>
where
    E: JobExecutor + 'static,
{
    let config = Arc::new(config);
    let store = JobStore::new(&config.root)?;

    info!(
        root = %config.root.display(),
        workers = config.workers,
        build = config.build,
        "server starting"
    );

    let (requests_tx, requests_rx) = mpsc::channel::<JobRequest>(config.workers.max(1));
    let mut actors: JoinSet<Result<()>> = JoinSet::new();

    actors.spawn(shutdown::listen_for_interrupt(cancel.clone()));

    let broker = Broker::new(
        store.clone(),
        JobQueue::new(&config.queue),
        config.tick,
        requests_rx,
    );
    let token = cancel.clone();
    actors.spawn(async move {
        broker.run(token).await;
        Ok(())
    });

    for id in 0..config.workers.max(1) {
        let worker = Worker::new(id, store.clone(), Arc::clone(&executor), requests_tx.clone());
        let token = cancel.clone();
        actors.spawn(async move {
            worker.run(token).await;
            Ok(())
        });
    }
    drop(requests_tx);

    shutdown::wait_for_quiescence(actors, &cancel).await
}
