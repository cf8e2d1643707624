// src/exec/phase_runner.rs

//! Runs a single shell command with its standard streams wired to files.

use std::fs::File;
use std::path::Path;
use std::process::Stdio;

use tokio::process::Child;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::{Result, SimonError};
use crate::exec::shell::shell_command;

/// Where a phase reads from and writes to.
#[derive(Debug, Clone, Copy)]
pub struct PhaseIo<'a> {
    /// File fed to the command's stdin; `None` means stdin is closed.
    pub stdin: Option<&'a Path>,
    pub stdout: &'a Path,
    pub stderr: &'a Path,
}

/// Run `cmd` to completion, or until `cancel` fires.
///
/// - Every file is opened before the command is spawned; if any of them
///   can't be opened nothing is started. A missing stdin file is reported as
///   [`SimonError::NotFound`].
/// - A non-zero exit (or death by signal) is [`SimonError::Subprocess`].
/// - On cancellation everything the command started is killed and the shell
///   is reaped before returning [`SimonError::Cancelled`]. On unix the
///   command runs in its own process group, and the whole group is killed.
///
/// The files are owned by the spawned command's configuration and are
/// released when this function returns, on every path.
pub async fn run_phase(cmd: &str, io: PhaseIo<'_>, cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        debug!(cmd, "cancelled before start; not spawning");
        return Err(SimonError::Cancelled);
    }

    let stdin = match io.stdin {
        Some(path) => {
            let file = File::open(path).map_err(|e| SimonError::from_io_at(e, path))?;
            Stdio::from(file)
        }
        None => Stdio::null(),
    };
    let stdout = File::create(io.stdout)?;
    let stderr = File::create(io.stderr)?;

    let mut command = shell_command(cmd);
    command
        .stdin(stdin)
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr))
        .kill_on_drop(true);
    #[cfg(unix)]
    command.process_group(0);

    let mut child = command.spawn()?;
    // Drop our copies of the descriptors; the child holds its own.
    drop(command);

    tokio::select! {
        status = child.wait() => {
            let status = status?;
            debug!(cmd, %status, "phase command exited");
            if status.success() {
                Ok(())
            } else {
                Err(SimonError::Subprocess { status })
            }
        }

        _ = cancel.cancelled() => {
            info!(cmd, "cancellation requested; killing phase command");
            terminate(&mut child, cmd).await;
            Err(SimonError::Cancelled)
        }
    }
}

/// Kill the child's process group (unix), then the child itself, and reap it.
async fn terminate(child: &mut Child, cmd: &str) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        // The child leads its own group, so its pid is the group id.
        if let Some(pid) = child.id()
            && let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL)
        {
            warn!(cmd, pgid = pid, error = %e, "failed to kill process group");
        }
    }

    if let Err(e) = child.kill().await {
        warn!(cmd, error = %e, "failed to kill phase command");
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::time::Duration;

    use super::*;

    /// Zombies count as dead: they only wait for their parent to reap them.
    fn alive(pid: &str) -> bool {
        match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
            Ok(stat) => !stat
                .rsplit(')')
                .next()
                .is_some_and(|rest| rest.trim_start().starts_with('Z')),
            Err(_) if std::path::Path::new("/proc/self").exists() => false,
            Err(_) => std::process::Command::new("sh")
                .args(["-c", &format!("kill -0 {pid} 2>/dev/null")])
                .status()
                .is_ok_and(|status| status.success()),
        }
    }

    #[tokio::test]
    async fn missing_stdin_starts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("x.out");
        let err = dir.path().join("x.err");
        let absent = dir.path().join("absent");
        let io = PhaseIo {
            stdin: Some(absent.as_path()),
            stdout: &out,
            stderr: &err,
        };

        let res = run_phase("echo hi", io, &CancellationToken::new()).await;

        assert!(matches!(res, Err(SimonError::NotFound(_))));
        assert!(!out.exists());
        assert!(!err.exists());
    }

    #[tokio::test]
    async fn cancel_kills_running_command() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("x.out");
        let err = dir.path().join("x.err");
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let io = PhaseIo {
            stdin: None,
            stdout: &out,
            stderr: &err,
        };
        let res = tokio::time::timeout(
            Duration::from_secs(5),
            run_phase("exec sleep 30", io, &cancel),
        )
        .await
        .expect("phase was not cancelled in time");

        assert!(matches!(res, Err(SimonError::Cancelled)));
    }

    #[tokio::test]
    async fn already_cancelled_does_not_create_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("x.out");
        let err = dir.path().join("x.err");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let io = PhaseIo {
            stdin: None,
            stdout: &out,
            stderr: &err,
        };
        let res = run_phase("echo hi", io, &cancel).await;

        assert!(matches!(res, Err(SimonError::Cancelled)));
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn cancel_kills_processes_the_command_started() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("x.out");
        let err = dir.path().join("x.err");
        let pid_file = dir.path().join("pid");
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        let watched = pid_file.clone();
        tokio::spawn(async move {
            while !std::fs::read_to_string(&watched).is_ok_and(|s| s.ends_with('\n')) {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            trigger.cancel();
        });

        // The inner shell is a grandchild that outlives a plain kill of `sh`.
        let cmd = format!(
            "sh -c 'echo $$ > {}; exec sleep 30'; echo done",
            pid_file.display()
        );
        let io = PhaseIo {
            stdin: None,
            stdout: &out,
            stderr: &err,
        };
        let res = tokio::time::timeout(Duration::from_secs(5), run_phase(&cmd, io, &cancel))
            .await
            .expect("phase was not cancelled in time");
        assert!(matches!(res, Err(SimonError::Cancelled)));

        let pid = std::fs::read_to_string(&pid_file).unwrap().trim().to_string();
        let gone = tokio::time::timeout(Duration::from_secs(5), async {
            while alive(&pid) {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(gone.is_ok(), "process {pid} survived cancellation");
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "");
    }
}
