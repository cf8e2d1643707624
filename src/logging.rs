// src/logging.rs

//! Logging setup for `simon` using `tracing` + `tracing-subscriber`.
//!
//! Filter selection:
//! 1. `--log-level` CLI flag (if provided) sets one level for everything
//! 2. `SIMON_LOG` environment variable, in `EnvFilter` syntax
//!    (e.g. "info" or "warn,simon::server=debug")
//! 3. default to `info`
//!
//! Logs are sent to STDERR so that stdout only carries job identifiers.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

const LOG_ENV: &str = "SIMON_LOG";

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let filter = build_filter(cli_level, env.as_deref());

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("can't install log subscriber: {e}"))?;

    Ok(())
}

fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> EnvFilter {
    if let Some(lvl) = cli_level {
        return EnvFilter::new(level_name(lvl));
    }

    match env.map(EnvFilter::try_new) {
        Some(Ok(filter)) => filter,
        Some(Err(e)) => {
            eprintln!("ignoring invalid {LOG_ENV}: {e}");
            EnvFilter::new("info")
        }
        None => EnvFilter::new("info"),
    }
}

fn level_name(lvl: LogLevel) -> &'static str {
    match lvl {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_accepts_per_module_directives() {
        let filter = build_filter(None, Some("warn,simon::server=debug"));
        let shown = filter.to_string().to_lowercase();
        assert!(shown.contains("simon::server=debug"), "{shown}");
        assert!(shown.contains("warn"), "{shown}");
    }

    #[test]
    fn cli_flag_wins_over_env() {
        let filter = build_filter(Some(LogLevel::Trace), Some("simon::server=debug"));
        assert_eq!(filter.to_string().to_lowercase(), "trace");
    }

    #[test]
    fn invalid_env_falls_back_to_info() {
        let filter = build_filter(None, Some("simon=loud"));
        assert_eq!(filter.to_string().to_lowercase(), "info");
    }
}
