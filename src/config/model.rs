// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Server settings as read from a TOML file.
///
/// ```toml
/// [server]
/// workers = 4
/// tick_ms = 100
/// queue = "queue"
/// build = true
/// ```
///
/// Every field is optional; missing values fall back to command-line flags
/// and then to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub server: ServerSection,
}

/// `[server]` section. Also used to carry command-line overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// Number of concurrent workers.
    pub workers: Option<usize>,

    /// Queue polling interval in milliseconds.
    pub tick_ms: Option<u64>,

    /// Queue file; relative paths are resolved against the root.
    pub queue: Option<PathBuf>,

    /// Whether workers run the build phase before init and run.
    pub build: Option<bool>,
}

impl ServerSection {
    /// Values set in `over` win; anything it leaves unset is kept from `self`.
    pub fn overlay(self, over: ServerSection) -> ServerSection {
        ServerSection {
            workers: over.workers.or(self.workers),
            tick_ms: over.tick_ms.or(self.tick_ms),
            queue: over.queue.or(self.queue),
            build: over.build.or(self.build),
        }
    }
}

/// Immutable server configuration, built once at startup and shared by the
/// broker and every worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Absolute scheduling root.
    pub root: PathBuf,
    /// Absolute path of the queue file.
    pub queue: PathBuf,
    /// Pool size, at least one.
    pub workers: usize,
    /// How often the broker polls the queue.
    pub tick: Duration,
    pub build: bool,
}

pub const DEFAULT_QUEUE_FILE: &str = "queue";
pub const DEFAULT_TICK_MS: u64 = 100;

pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
