//! The external configure and build steps.
//!
//! The orchestrator only talks to the [`Toolchain`] trait, so tests can
//! substitute a recording implementation for the real [`CMake`] one.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use crate::error::{BuildError, Result, Step};

/// Runs the generator and the build.
pub trait Toolchain {
    /// Runs the configure step for `source_dir` into `build_dir`.
    ///
    /// `env` holds variables set on top of the inherited environment.
    fn configure(
        &self,
        source_dir: &Path,
        build_dir: &Path,
        args: &[String],
        env: &BTreeMap<String, String>,
    ) -> Result<()>;

    /// Runs the build step in an already configured `build_dir`.
    fn build(&self, build_dir: &Path, args: &[String]) -> Result<()>;
}

/// The real toolchain: `cmake` found on `PATH`.
#[derive(Debug, Clone)]
pub struct CMake {
    program: PathBuf,
}

impl CMake {
    /// Locates `cmake` on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::ToolNotFound`] if it isn't there.
    pub fn locate() -> Result<Self> {
        let program = which::which("cmake").map_err(|source| BuildError::ToolNotFound {
            tool: "cmake".to_string(),
            source,
        })?;
        Ok(Self { program })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn run(&self, step: Step, command: &mut Command) -> Result<()> {
        let status = command.status().map_err(|source| BuildError::IoError {
            path: self.program.clone(),
            source,
        })?;
        check_status(step, status)
    }
}

impl Toolchain for CMake {
    fn configure(
        &self,
        source_dir: &Path,
        build_dir: &Path,
        args: &[String],
        env: &BTreeMap<String, String>,
    ) -> Result<()> {
        let mut command = Command::new(&self.program);
        command
            .arg("-S")
            .arg(source_dir)
            .arg("-B")
            .arg(build_dir)
            .args(args)
            .envs(env);
        self.run(Step::Configure, &mut command)
    }

    fn build(&self, build_dir: &Path, args: &[String]) -> Result<()> {
        let mut command = Command::new(&self.program);
        command.arg("--build").arg(build_dir).args(args);
        self.run(Step::Build, &mut command)
    }
}

fn check_status(step: Step, status: ExitStatus) -> Result<()> {
    if status.success() {
        Ok(())
    } else {
        Err(BuildError::StepFailed {
            step,
            code: status.code(),
        })
    }
}

/// Whether the Ninja generator is available.
pub fn has_ninja() -> bool {
    which::which("ninja").is_ok()
}

/// Default interpreter handed to the generator, if one is on `PATH`.
pub fn default_interpreter() -> Option<PathBuf> {
    which::which("python3").ok()
}
