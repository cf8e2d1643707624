// src/errors.rs

//! Crate-wide error type and helpers.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::job::{JobState, Phase};

#[derive(Error, Debug)]
pub enum SimonError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The command started but did not exit cleanly (non-zero code or signal).
    #[error("command failed with {status}")]
    Subprocess { status: ExitStatus },

    #[error("cancelled")]
    Cancelled,

    #[error("can't encode job spec: {0}")]
    Encoding(#[source] serde_json::Error),

    #[error("can't decode {path:?}: {source}")]
    Decoding {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("not found: {0:?}")]
    NotFound(PathBuf),

    #[error("version control: {0}")]
    VersionControl(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// A lifecycle phase failed; carries the job identifier and phase name.
    #[error("job {job:?}: {phase} failed: {source}")]
    Phase {
        job: String,
        phase: Phase,
        #[source]
        source: Box<SimonError>,
    },

    /// A phase was requested out of lifecycle order.
    #[error("job {job:?}: can't {phase} from state {state}")]
    OutOfOrder {
        job: String,
        phase: Phase,
        state: JobState,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SimonError {
    /// True if this error (or the phase error it wraps) is a cancellation.
    pub fn is_cancelled(&self) -> bool {
        match self {
            SimonError::Cancelled => true,
            SimonError::Phase { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }

    /// Map an IO error on `path` to `NotFound` when the file is missing.
    pub fn from_io_at(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            SimonError::NotFound(path.into())
        } else {
            SimonError::Io(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, SimonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_is_seen_through_phase_wrapper() {
        let err = SimonError::Phase {
            job: "2024-01-01/00:00:00.000000000".to_string(),
            phase: Phase::Run,
            source: Box::new(SimonError::Cancelled),
        };
        assert!(err.is_cancelled());
        assert!(!SimonError::Config("x".into()).is_cancelled());
    }

    #[test]
    fn missing_file_maps_to_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(
            SimonError::from_io_at(io, "ini.out"),
            SimonError::NotFound(_)
        ));

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        assert!(matches!(SimonError::from_io_at(io, "ini.out"), SimonError::Io(_)));
    }
}
