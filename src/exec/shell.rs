// src/exec/shell.rs

//! Shell command construction shared by the phase runner and VCS capture.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::errors::{Result, SimonError};

/// Build a shell command appropriate for the platform.
pub fn shell_command(cmd: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    }
}

/// Run `cmd` in `cwd` and return its stdout.
///
/// Stderr is inherited so tool diagnostics reach the operator. A non-zero
/// exit is reported as [`SimonError::Subprocess`].
pub async fn shell_out(cmd: &str, cwd: &Path) -> Result<String> {
    debug!(cmd, cwd = %cwd.display(), "shelling out");

    let output = shell_command(cmd)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stderr(Stdio::inherit())
        .output()
        .await?;

    if !output.status.success() {
        return Err(SimonError::Subprocess {
            status: output.status,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
