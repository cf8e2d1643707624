// src/job/version.rs

//! Source version capture through git.

use std::path::Path;

use tracing::debug;

use crate::errors::{Result, SimonError};
use crate::exec::shell_out;

/// Revision id and uncommitted diff of a working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub revision: String,
    pub patch: Vec<String>,
}

/// Capture the current git revision and working tree diff of `cwd`.
pub async fn capture(cwd: &Path) -> Result<Version> {
    let revision = shell_out("git rev-parse HEAD", cwd)
        .await
        .map_err(|e| SimonError::VersionControl(format!("can't obtain git revision: {e}")))?;

    let patch = shell_out("git diff -p", cwd)
        .await
        .map_err(|e| SimonError::VersionControl(format!("can't obtain git diff: {e}")))?;

    let version = Version {
        revision: revision.trim().to_string(),
        patch: patch.split('\n').map(str::to_string).collect(),
    };
    debug!(revision = %version.revision, patch_lines = version.patch.len(), "captured version");
    Ok(version)
}
