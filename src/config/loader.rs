// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{RawConfigFile, ServerConfig, ServerSection};
use crate::config::validate::resolve_server_config;
use crate::errors::Result;

/// Load a configuration file from a given path.
///
/// This only performs TOML deserialization; see [`load_server_config`] for
/// merging and validation.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Build the server configuration for `root`.
///
/// - If `explicit` is given, that file must exist.
/// - Otherwise `<root>/simon.toml` is read when present.
/// - `overrides` (command-line flags) win over file values.
pub fn load_server_config(
    root: &Path,
    explicit: Option<&Path>,
    overrides: ServerSection,
) -> Result<ServerConfig> {
    let file = match explicit {
        Some(path) => Some(load_from_path(path)?),
        None => {
            let path = default_config_path(root);
            if path.is_file() {
                debug!(path = %path.display(), "using config file from root");
                Some(load_from_path(&path)?)
            } else {
                None
            }
        }
    };

    let section = file.map(|f| f.server).unwrap_or_default().overlay(overrides);
    resolve_server_config(root, section)
}

/// `simon.toml` in the scheduling root.
pub fn default_config_path(root: &Path) -> PathBuf {
    root.join("simon.toml")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn flags_override_file_values() {
        let root = tempfile::tempdir().unwrap();
        fs::write(
            default_config_path(root.path()),
            "[server]\nworkers = 3\ntick_ms = 250\nbuild = false\n",
        )
        .unwrap();

        let overrides = ServerSection {
            workers: Some(5),
            ..Default::default()
        };
        let cfg = load_server_config(root.path(), None, overrides).unwrap();

        assert_eq!(cfg.workers, 5);
        assert_eq!(cfg.tick, Duration::from_millis(250));
        assert!(!cfg.build);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let res = load_server_config(
            root.path(),
            Some(&root.path().join("nope.toml")),
            ServerSection::default(),
        );
        assert!(res.is_err());
    }
}
