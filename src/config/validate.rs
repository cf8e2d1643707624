// src/config/validate.rs

use std::path::Path;
use std::time::Duration;

use tracing::warn;

use crate::config::model::{
    DEFAULT_QUEUE_FILE, DEFAULT_TICK_MS, ServerConfig, ServerSection, default_workers,
};
use crate::errors::{Result, SimonError};

/// Turn merged settings into a [`ServerConfig`] rooted at `root` (absolute).
pub fn resolve_server_config(root: &Path, section: ServerSection) -> Result<ServerConfig> {
    let workers = validate_workers(section.workers.unwrap_or_else(default_workers));
    let tick = validate_tick(section.tick_ms.unwrap_or(DEFAULT_TICK_MS))?;

    let queue = section
        .queue
        .unwrap_or_else(|| DEFAULT_QUEUE_FILE.into());
    if queue.as_os_str().is_empty() {
        return Err(SimonError::Config("queue path must not be empty".to_string()));
    }
    let queue = if queue.is_absolute() {
        queue
    } else {
        root.join(queue)
    };

    Ok(ServerConfig {
        root: root.to_path_buf(),
        queue,
        workers,
        tick,
        build: section.build.unwrap_or(true),
    })
}

fn validate_workers(workers: usize) -> usize {
    if workers == 0 {
        warn!("workers must be >= 1; using a single worker");
        return 1;
    }
    workers
}

fn validate_tick(tick_ms: u64) -> Result<Duration> {
    if tick_ms == 0 {
        return Err(SimonError::Config(
            "[server].tick_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(Duration::from_millis(tick_ms))
}
