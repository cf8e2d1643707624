// src/job/lifecycle.rs

//! The build → init → run state machine of a single job.

use std::fmt;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::errors::{Result, SimonError};
use crate::exec::{PhaseIo, run_phase};
use crate::job::{LocatedJob, Phase};
use crate::store::JobStore;

/// Where a job is in its lifecycle.
///
/// `Failed` is absorbing: once a phase fails, no further phase runs on the
/// same [`Lifecycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Defined,
    Built,
    Initialized,
    RanSuccessfully,
    Failed(Phase),
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Defined => f.write_str("defined"),
            JobState::Built => f.write_str("built"),
            JobState::Initialized => f.write_str("initialized"),
            JobState::RanSuccessfully => f.write_str("ran successfully"),
            JobState::Failed(phase) => write!(f, "failed during {phase}"),
        }
    }
}

/// Drives one located job through its phases.
///
/// Phases may only run in order. Build is optional: `init` is also allowed
/// straight from `Defined`, reusing whatever a previous build left behind.
#[derive(Debug)]
pub struct Lifecycle<'a> {
    job: &'a LocatedJob,
    store: &'a JobStore,
    state: JobState,
}

impl<'a> Lifecycle<'a> {
    pub fn new(job: &'a LocatedJob, store: &'a JobStore) -> Self {
        Self {
            job,
            store,
            state: JobState::Defined,
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub async fn build(&mut self, cancel: &CancellationToken) -> Result<()> {
        self.expect_state(Phase::Build, &[JobState::Defined])?;
        self.run_phase(Phase::Build, cancel).await?;
        self.state = JobState::Built;
        Ok(())
    }

    pub async fn init(&mut self, cancel: &CancellationToken) -> Result<()> {
        self.expect_state(Phase::Init, &[JobState::Defined, JobState::Built])?;
        self.run_phase(Phase::Init, cancel).await?;
        self.state = JobState::Initialized;
        Ok(())
    }

    /// Run the job, feeding it the output of the init phase on stdin.
    pub async fn run(&mut self, cancel: &CancellationToken) -> Result<()> {
        self.expect_state(Phase::Run, &[JobState::Initialized])?;
        self.run_phase(Phase::Run, cancel).await?;
        self.state = JobState::RanSuccessfully;
        Ok(())
    }

    /// Run every remaining phase, stopping at the first failure.
    pub async fn execute(&mut self, build: bool, cancel: &CancellationToken) -> Result<()> {
        let id = self.id();
        if build {
            self.build(cancel).await?;
        } else {
            info!(job = %id, "skipping build");
        }
        self.init(cancel).await?;
        self.run(cancel).await
    }

    fn id(&self) -> String {
        self.store.normalize_identifier(self.job.dir())
    }

    fn expect_state(&self, phase: Phase, allowed: &[JobState]) -> Result<()> {
        if allowed.contains(&self.state) {
            return Ok(());
        }
        Err(SimonError::OutOfOrder {
            job: self.id(),
            phase,
            state: self.state,
        })
    }

    async fn run_phase(&mut self, phase: Phase, cancel: &CancellationToken) -> Result<()> {
        let id = self.id();
        let cmd = phase.command(self.job.spec());

        let stdin = phase.stdin_file().map(|f| self.store.in_job(self.job, f));
        let stdout = self.store.in_job(self.job, phase.stdout_file());
        let stderr = self.store.in_job(self.job, phase.stderr_file());
        let io = PhaseIo {
            stdin: stdin.as_deref(),
            stdout: &stdout,
            stderr: &stderr,
        };

        info!(job = %id, %phase, cmd, "phase starts");

        match run_phase(cmd, io, cancel).await {
            Ok(()) => {
                info!(job = %id, %phase, "phase done");
                Ok(())
            }
            Err(source) => {
                error!(job = %id, %phase, error = %source, "phase failed");
                self.state = JobState::Failed(phase);
                Err(SimonError::Phase {
                    job: id,
                    phase,
                    source: Box::new(source),
                })
            }
        }
    }
}
