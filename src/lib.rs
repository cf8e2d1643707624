// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod job;
pub mod logging;
pub mod server;
pub mod store;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cli::{CliArgs, Command};
use crate::config::load_server_config;
use crate::job::{JobSpec, Lifecycle, LocatedJob, read_commands};
use crate::server::shutdown::listen_for_interrupt;
use crate::store::JobStore;

/// High-level entry point used by `main.rs`.
///
/// Interactive commands stop at the first failure; `serve` keeps going
/// until interrupted.
pub async fn run(args: CliArgs) -> Result<()> {
    let store = JobStore::new(&args.root)
        .with_context(|| format!("resolving root {:?}", args.root))?;

    match args.command {
        Command::Define => {
            let job = define(&store).await?;
            println!("{}", store.normalize_identifier(job.dir()));
        }

        Command::Build(job_args) => {
            let job = load_or_define(&store, job_args.job.as_deref()).await?;
            println!("{}", store.normalize_identifier(job.dir()));

            with_interrupt(|cancel| async move {
                Lifecycle::new(&job, &store).build(&cancel).await
            })
            .await?;
        }

        Command::Run(run_args) => {
            let job = load_or_define(&store, run_args.job.job.as_deref()).await?;
            println!("{}", store.normalize_identifier(job.dir()));

            let build = !run_args.no_build;
            with_interrupt(|cancel| async move {
                Lifecycle::new(&job, &store).execute(build, &cancel).await
            })
            .await?;
        }

        Command::Serve(serve_args) => {
            let config = load_server_config(
                store.root(),
                serve_args.config.as_deref(),
                serve_args.overrides(),
            )?;
            server::serve(config, CancellationToken::new()).await?;
        }
    }

    Ok(())
}

/// Read commands from stdin, stamp them with the current git version and
/// store the new job under a fresh path.
async fn define(store: &JobStore) -> Result<LocatedJob> {
    let commands = read_commands(std::io::stdin().lock())?;

    let cwd = std::env::current_dir().context("reading current directory")?;
    let version = job::version::capture(&cwd).await?;

    let spec = JobSpec::define(
        commands.build,
        commands.init,
        commands.run,
        version.revision,
        version.patch,
    );
    let job = store.locate_fresh(spec);
    store.persist(&job)?;

    info!(job = %store.normalize_identifier(job.dir()), "job defined");
    Ok(job)
}

async fn load_or_define(store: &JobStore, identifier: Option<&str>) -> Result<LocatedJob> {
    match identifier {
        Some(id) => Ok(store.load(id)?),
        None => define(store).await,
    }
}

/// Run `f` with a token that Ctrl-C cancels.
async fn with_interrupt<F, Fut>(f: F) -> Result<()>
where
    F: FnOnce(CancellationToken) -> Fut,
    Fut: std::future::Future<Output = errors::Result<()>>,
{
    run_cancellable(listen_for_interrupt, f).await
}

/// Run `f` next to a spawned `listener` that may cancel their shared token.
///
/// When the token ends up cancelled the listener is awaited, and its error
/// takes precedence over whatever `f` returned. Otherwise it is aborted.
async fn run_cancellable<L, LFut, F, Fut>(listener: L, f: F) -> Result<()>
where
    L: FnOnce(CancellationToken) -> LFut,
    LFut: std::future::Future<Output = errors::Result<()>> + Send + 'static,
    F: FnOnce(CancellationToken) -> Fut,
    Fut: std::future::Future<Output = errors::Result<()>>,
{
    let cancel = CancellationToken::new();
    let listener = tokio::spawn(listener(cancel.clone()));

    let res = f(cancel.clone()).await;

    if cancel.is_cancelled() {
        listener
            .await
            .context("interrupt listener panicked")?
            .context("listening for interrupts")?;
    } else {
        listener.abort();
    }
    Ok(res?)
}
