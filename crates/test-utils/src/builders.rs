#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::time::Duration;

use simon::config::ServerConfig;
use simon::job::{JobSpec, LocatedJob};
use simon::store::JobStore;

/// Builder for `JobSpec` to simplify test setup.
pub struct JobSpecBuilder {
    spec: JobSpec,
}

impl JobSpecBuilder {
    /// A spec whose phases all succeed and produce no output.
    pub fn new() -> Self {
        Self {
            spec: JobSpec::define("true", "true", "true", "0000000", vec![]),
        }
    }

    pub fn build_cmd(mut self, cmd: &str) -> Self {
        self.spec.build_cmd = cmd.to_string();
        self
    }

    pub fn init_cmd(mut self, cmd: &str) -> Self {
        self.spec.init_cmd = cmd.to_string();
        self
    }

    pub fn run_cmd(mut self, cmd: &str) -> Self {
        self.spec.run_cmd = cmd.to_string();
        self
    }

    pub fn revision(mut self, rev: &str) -> Self {
        self.spec.revision = rev.to_string();
        self
    }

    pub fn patch_line(mut self, line: &str) -> Self {
        self.spec.patch.push(line.to_string());
        self
    }

    pub fn build(self) -> JobSpec {
        self.spec
    }

    /// Allocate a fresh directory in `store` and persist the spec there.
    pub fn persist_in(self, store: &JobStore) -> LocatedJob {
        let job = store.locate_fresh(self.spec);
        store.persist(&job).expect("Failed to persist job spec");
        job
    }
}

impl Default for JobSpecBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Overwrite the queue file with one identifier per line.
pub fn write_queue(path: &Path, identifiers: &[String]) {
    let mut contents = identifiers.join("\n");
    contents.push('\n');
    fs::write(path, contents).expect("Failed to write queue file");
}

/// Server configuration for tests: fast ticks, queue at `<root>/queue`.
pub fn server_config(store: &JobStore, workers: usize) -> ServerConfig {
    ServerConfig {
        root: store.root().to_path_buf(),
        queue: store.root().join("queue"),
        workers,
        tick: Duration::from_millis(20),
        build: true,
    }
}

/// Read a job file, or `None` if it doesn't exist.
pub fn read_job_file(store: &JobStore, job: &LocatedJob, file: &str) -> Option<String> {
    fs::read_to_string(store.in_job(job, file)).ok()
}
