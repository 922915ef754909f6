//! Absolute locations of every file cmake-hold reads or writes.

use std::path::{Path, PathBuf};

use crate::arg_cache::ARG_CACHE_FILE_NAME;
use crate::cli::{GlobalOpts, normalize_path};
use crate::compile_commands::COMPILE_COMMANDS_FILE_NAME;
use crate::reconfigure::STATE_FILE_NAME;

/// File name of the build directory lock.
pub const LOCK_FILE_NAME: &str = ".cmake-hold.lock";

/// Paths derived from the global options, all absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Project root; holds the merged compile command database.
    pub project_root: PathBuf,
    /// The generator's binary directory.
    pub build_dir: PathBuf,
    /// The argument cache.
    pub args_cache_path: PathBuf,
}

impl Layout {
    /// Resolves the global options against `working_dir`.
    ///
    /// The project root is relative to `working_dir`; the build directory and
    /// argument cache path are relative to the project root.
    pub fn resolve(opts: &GlobalOpts, working_dir: &Path) -> Self {
        let project_root = normalize_path(working_dir, opts.project_root());
        let build_dir = normalize_path(&project_root, opts.build_dir());
        let args_cache_path = match opts.args_cache_path() {
            Some(path) => normalize_path(&project_root, path),
            None => build_dir.join(ARG_CACHE_FILE_NAME),
        };

        Self {
            project_root,
            build_dir,
            args_cache_path,
        }
    }

    /// Layout with every file at its default location.
    pub fn new(project_root: impl Into<PathBuf>, build_dir: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        let build_dir = normalize_path(&project_root, build_dir.into());
        let args_cache_path = build_dir.join(ARG_CACHE_FILE_NAME);

        Self {
            project_root,
            build_dir,
            args_cache_path,
        }
    }

    /// The generator's state file.
    pub fn state_file(&self) -> PathBuf {
        self.build_dir.join(STATE_FILE_NAME)
    }

    /// The directory shared by all module build directories.
    ///
    /// Per-module compile command databases are searched one level below it,
    /// and output links are created in it.
    pub fn build_parent(&self) -> &Path {
        self.build_dir.parent().unwrap_or(&self.build_dir)
    }

    /// The merged compile command database.
    pub fn compile_commands_path(&self) -> PathBuf {
        self.project_root.join(COMPILE_COMMANDS_FILE_NAME)
    }

    /// The lock serializing invocations against this build directory.
    pub fn lock_path(&self) -> PathBuf {
        self.build_dir.join(LOCK_FILE_NAME)
    }
}
