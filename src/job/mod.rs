// src/job/mod.rs

//! Jobs: what they are and how they progress.
//!
//! - [`spec`] holds the immutable [`JobSpec`] and its located form.
//! - [`phase`] describes the three phases and their files.
//! - [`lifecycle`] runs the phases in order on top of the phase runner.
//! - [`version`] captures the git revision a job is defined against.

pub mod lifecycle;
pub mod phase;
pub mod spec;
pub mod version;

pub use lifecycle::{JobState, Lifecycle};
pub use phase::Phase;
pub use spec::{Commands, JobSpec, LocatedJob, read_commands};
pub use version::Version;
