// src/exec/mod.rs

//! Process execution layer.
//!
//! Commands are run with `tokio::process::Command` through the platform
//! shell.
//!
//! - [`phase_runner`] runs one lifecycle phase with its stdin/stdout/stderr
//!   wired to files and honours a cancellation token.
//! - [`shell`] builds the shell invocation and captures output for small
//!   helper commands (e.g. version control queries).

pub mod phase_runner;
pub mod shell;

pub use phase_runner::{PhaseIo, run_phase};
pub use shell::{shell_command, shell_out};
