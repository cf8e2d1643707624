// src/server/queue.rs

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::errors::Result;

/// File-backed FIFO of job identifiers, one per line, head first.
///
/// Only the broker touches the file while a server runs; there is no locking
/// between processes. Appending is left to whoever defines jobs.
#[derive(Debug, Clone)]
pub struct JobQueue {
    path: PathBuf,
}

impl JobQueue {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pop the head identifier, if any.
    ///
    /// A missing file is created empty and counts as an empty queue. Blank
    /// lines are skipped. The remainder is written back (via rename) before
    /// the head is returned, so a failed rewrite never hands out an entry
    /// that is still queued.
    pub fn dequeue(&self) -> Result<Option<String>> {
        let staging = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        self.dequeue_staged_in(staging)
    }

    /// Same as [`dequeue`](Self::dequeue), with the replacement file written
    /// in `staging` first. `staging` must be on the queue's filesystem.
    fn dequeue_staged_in(&self, staging: &Path) -> Result<Option<String>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "queue file missing; creating it");
                if let Some(parent) = self.path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&self.path, b"")?;
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let mut entries = contents.lines().map(str::trim).filter(|l| !l.is_empty());
        let Some(head) = entries.next() else {
            return Ok(None);
        };
        let rest: Vec<&str> = entries.collect();

        self.rewrite(&rest, staging)?;
        debug!(job = head, remaining = rest.len(), "dequeued job");
        Ok(Some(head.to_string()))
    }

    /// Replace the queue with `entries`: write a temp file in `staging`,
    /// fsync, then rename over the original. On failure the temp file is
    /// removed and the queue is left as it was.
    fn rewrite(&self, entries: &[&str], staging: &Path) -> Result<()> {
        let mut contents = entries.join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }

        let mut tmp = NamedTempFile::new_in(staging)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}
