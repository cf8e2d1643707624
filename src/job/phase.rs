// src/job/phase.rs

use std::fmt;

use crate::job::JobSpec;

/// One step of a job's lifecycle.
///
/// Each phase knows which command of the [`JobSpec`] it runs and which files
/// capture its output. Only [`Phase::Run`] reads from a file: the output of
/// [`Phase::Init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Build,
    Init,
    Run,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Build, Phase::Init, Phase::Run];

    pub fn name(self) -> &'static str {
        match self {
            Phase::Build => "build",
            Phase::Init => "init",
            Phase::Run => "run",
        }
    }

    pub fn command(self, spec: &JobSpec) -> &str {
        match self {
            Phase::Build => &spec.build_cmd,
            Phase::Init => &spec.init_cmd,
            Phase::Run => &spec.run_cmd,
        }
    }

    pub fn stdout_file(self) -> &'static str {
        match self {
            Phase::Build => "bld.out",
            Phase::Init => "ini.out",
            Phase::Run => "run.out",
        }
    }

    pub fn stderr_file(self) -> &'static str {
        match self {
            Phase::Build => "bld.err",
            Phase::Init => "ini.err",
            Phase::Run => "run.err",
        }
    }

    pub fn stdin_file(self) -> Option<&'static str> {
        match self {
            Phase::Run => Some(Phase::Init.stdout_file()),
            Phase::Build | Phase::Init => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_reads_init_output() {
        assert_eq!(Phase::Run.stdin_file(), Some("ini.out"));
        assert_eq!(Phase::Build.stdin_file(), None);
        assert_eq!(Phase::Init.stdin_file(), None);
    }

    #[test]
    fn output_files_are_distinct() {
        let mut names: Vec<_> = Phase::ALL
            .iter()
            .flat_map(|p| [p.stdout_file(), p.stderr_file()])
            .collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 6);
    }

    #[test]
    fn picks_matching_command() {
        let spec = JobSpec::define("b", "i", "r", "", vec![]);
        assert_eq!(Phase::Build.command(&spec), "b");
        assert_eq!(Phase::Init.command(&spec), "i");
        assert_eq!(Phase::Run.command(&spec), "r");
    }
}
