// src/server/shutdown.rs

//! Interrupt handling and cooperative shutdown.

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::errors::{Result, SimonError};

/// Wait for Ctrl-C and cancel `cancel` when it arrives.
///
/// Returns early, without error, if someone else cancels the token first.
/// Failing to listen for the signal cancels the token too and is returned as
/// an error: without it the server could never be stopped cleanly.
pub async fn listen_for_interrupt(cancel: CancellationToken) -> Result<()> {
    tokio::select! {
        res = tokio::signal::ctrl_c() => match res {
            Ok(()) => {
                info!("interrupt received; shutting down");
                cancel.cancel();
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "failed to listen for Ctrl+C");
                cancel.cancel();
                Err(SimonError::Io(e))
            }
        },
        _ = cancel.cancelled() => {
            debug!("shutdown requested; signal listener exiting");
            Ok(())
        }
    }
}

/// Block until every actor in `actors` has finished.
///
/// The first error (or panic) is returned once all have stopped. A panicking
/// actor cancels `cancel` so the rest wind down as well.
pub async fn wait_for_quiescence(
    mut actors: JoinSet<Result<()>>,
    cancel: &CancellationToken,
) -> Result<()> {
    let mut first_err = None;

    while let Some(joined) = actors.join_next().await {
        let res = match joined {
            Ok(res) => res,
            Err(e) => {
                error!(error = %e, "actor panicked; shutting down");
                cancel.cancel();
                Err(SimonError::Other(e.into()))
            }
        };
        if let Err(e) = res {
            first_err.get_or_insert(e);
        }
    }

    info!("all actors stopped");
    first_err.map_or(Ok(()), Err)
}
