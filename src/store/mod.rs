// src/store/mod.rs

//! The scheduling root and the job directories under it.
//!
//! ```text
//! <root>/<day>/<time>/job_spec.json
//! <root>/<day>/<time>/{bld,ini,run}.{out,err}
//! ```

pub mod fresh;

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::debug;

use crate::errors::{Result, SimonError};
use crate::job::{JobSpec, LocatedJob};

/// Name of the manifest file inside every job directory.
pub const SPEC_FILE_NAME: &str = "job_spec.json";

/// Allocates, persists and loads jobs relative to one absolute root.
#[derive(Debug, Clone)]
pub struct JobStore {
    root: PathBuf,
}

impl JobStore {
    /// Make a store rooted at `root`, made absolute against the current
    /// directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = std::path::absolute(root.as_ref())?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// A path no other job in this process has been given.
    pub fn fresh_path(&self) -> PathBuf {
        fresh::job_path(&self.root, fresh::next_stamp())
    }

    pub fn locate_fresh(&self, spec: JobSpec) -> LocatedJob {
        spec.locate(self.fresh_path())
    }

    /// Absolute paths are kept; relative ones are taken relative to the root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn in_job(&self, job: &LocatedJob, file: &str) -> PathBuf {
        self.resolve(job.dir()).join(file)
    }

    /// Create the job directory if needed and write its manifest.
    pub fn persist(&self, job: &LocatedJob) -> Result<()> {
        let dir = self.resolve(job.dir());
        fs::create_dir_all(&dir)?;

        let path = dir.join(SPEC_FILE_NAME);
        let mut out = BufWriter::new(File::create(&path)?);

        let mut ser =
            serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
        job.spec().serialize(&mut ser).map_err(SimonError::Encoding)?;
        out.write_all(b"\n")?;
        out.flush()?;

        debug!(path = %path.display(), "stored job spec");
        Ok(())
    }

    /// Load the job identified by `identifier` (a job directory, absolute or
    /// root-relative).
    pub fn load(&self, identifier: &str) -> Result<LocatedJob> {
        let path = self.resolve(Path::new(identifier)).join(SPEC_FILE_NAME);
        let file = File::open(&path).map_err(|e| SimonError::from_io_at(e, &path))?;

        let spec: JobSpec = serde_json::from_reader(BufReader::new(file))
            .map_err(|source| SimonError::Decoding { path, source })?;

        Ok(spec.locate(identifier))
    }

    /// Render `dir` relative to the root when it lies under it; otherwise
    /// return it as given. Only for showing identifiers to people.
    pub fn normalize_identifier(&self, dir: &Path) -> String {
        match self.resolve(dir).strip_prefix(&self.root) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel.display().to_string(),
            _ => dir.display().to_string(),
        }
    }
}
