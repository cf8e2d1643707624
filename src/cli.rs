// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::ServerSection;

/// Command-line arguments for `simon`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "simon",
    version,
    about = "Define, build and run version-stamped simulation jobs.",
    long_about = None
)]
pub struct CliArgs {
    /// Scheduling root: job directories and the queue file live under it.
    #[arg(long, global = true, value_name = "DIR", env = "SIMON_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SIMON_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Define a job from three lines on stdin (build, init, run) and store it.
    Define,

    /// Run the build phase of a job.
    Build(JobArgs),

    /// Run a job: build (unless --no-build), then init, then run.
    Run(RunArgs),

    /// Serve queued jobs with a pool of workers until interrupted.
    Serve(ServeArgs),
}

#[derive(Debug, Clone, Args)]
pub struct JobArgs {
    /// Existing job to use. If omitted, a new job is defined from stdin.
    #[arg(value_name = "JOB")]
    pub job: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub job: JobArgs,

    /// Skip the build phase and reuse what a previous build produced.
    #[arg(long)]
    pub no_build: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Maximum number of jobs processed at once.
    ///
    /// Default: the available parallelism of this machine.
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// How often to check the queue file, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub tick: Option<u64>,

    /// Path to the queue file; if relative, resolved against the root.
    #[arg(long, value_name = "PATH")]
    pub queue: Option<PathBuf>,

    /// Don't build jobs before running them.
    #[arg(long)]
    pub no_build: bool,

    /// Server config file (TOML). Default: `simon.toml` in the root, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl ServeArgs {
    /// Flags that were given, as overrides for the config file.
    pub fn overrides(&self) -> ServerSection {
        ServerSection {
            workers: self.workers,
            tick_ms: self.tick,
            queue: self.queue.clone(),
            build: self.no_build.then_some(false),
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
