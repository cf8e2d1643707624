// src/job/spec.rs

use std::io::BufRead;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SimonError};

/// What a job is: the commands for each phase plus the source version they
/// were defined against.
///
/// Serialized as the job manifest (`job_spec.json`):
///
/// ```json
/// {
///     "revision": "3f1c…",
///     "patch": ["diff --git a/…", "…"],
///     "build": "make",
///     "init": "./gen-initial",
///     "run": "./simulate"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    pub revision: String,
    pub patch: Vec<String>,

    #[serde(rename = "build")]
    pub build_cmd: String,
    #[serde(rename = "init")]
    pub init_cmd: String,
    #[serde(rename = "run")]
    pub run_cmd: String,
}

impl JobSpec {
    pub fn define(
        build_cmd: impl Into<String>,
        init_cmd: impl Into<String>,
        run_cmd: impl Into<String>,
        revision: impl Into<String>,
        patch: Vec<String>,
    ) -> Self {
        Self {
            revision: revision.into(),
            patch,
            build_cmd: build_cmd.into(),
            init_cmd: init_cmd.into(),
            run_cmd: run_cmd.into(),
        }
    }

    /// Bind this spec to a storage location.
    pub fn locate(self, dir: impl Into<PathBuf>) -> LocatedJob {
        LocatedJob {
            dir: dir.into(),
            spec: self,
        }
    }
}

/// The three command lines read from an operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commands {
    pub build: String,
    pub init: String,
    pub run: String,
}

/// Read build, init and run commands, one per line.
///
/// The build and init lines are required and must be non-empty. The run line
/// may be missing entirely (EOF), in which case it is empty.
pub fn read_commands(reader: impl BufRead) -> Result<Commands> {
    let mut lines = reader.lines();

    let mut required = |what: &str| -> Result<String> {
        match lines.next().transpose()? {
            Some(line) if !line.trim().is_empty() => Ok(line),
            Some(_) => Err(SimonError::Config(format!("the {what} command is empty"))),
            None => Err(SimonError::Config(format!("missing the {what} command"))),
        }
    };

    let build = required("build")?;
    let init = required("init")?;
    let run = lines.next().transpose()?.unwrap_or_default();

    Ok(Commands { build, init, run })
}

/// A [`JobSpec`] bound to the directory that holds it.
///
/// The directory doubles as the job's identifier and never changes once set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedJob {
    dir: PathBuf,
    spec: JobSpec,
}

impl LocatedJob {
    /// Job directory as it was given (absolute or root-relative).
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn spec(&self) -> &JobSpec {
        &self.spec
    }

    pub fn into_spec(self) -> JobSpec {
        self.spec
    }
}
