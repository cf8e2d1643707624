// src/config/mod.rs

//! Server configuration.
//!
//! Responsibilities:
//! - Define the TOML-backed data model and the resolved `ServerConfig` (`model.rs`).
//! - Load a config file from disk and merge flag overrides (`loader.rs`).
//! - Validate and fill in defaults (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_from_path, load_server_config};
pub use model::{RawConfigFile, ServerConfig, ServerSection};
pub use validate::resolve_server_config;
