//! Error types for cmake-hold.
//!
//! This module defines all error types used throughout cmake-hold, using
//! a combination of `thiserror` for ergonomic error definitions and `miette`
//! for rich diagnostic output.
//!
//! # Error Handling Strategy
//!
//! - All errors derive from [`BuildError`]
//! - Each variant includes helpful error messages and diagnostic codes
//! - Nothing is retried; every error stops the pipeline where it happens
//! - A failed external step carries its exit status so the binary can surface
//!   it unchanged (see [`BuildError::exit_code`])
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use cmake_hold::error::{BuildError, Result};
//!
//! fn check_build_dir(path: &Path) -> Result<()> {
//!     if !path.is_dir() {
//!         return Err(BuildError::ConfigError(format!(
//!             "'{}' is not a directory",
//!             path.display()
//!         )));
//!     }
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// An external step run by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The generator (configure) step.
    Configure,
    /// The build step.
    Build,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Configure => f.write_str("configure"),
            Step::Build => f.write_str("build"),
        }
    }
}

/// Error types that can occur in cmake-hold operations
#[derive(Error, Debug, Diagnostic)]
pub enum BuildError {
    /// A required external tool is not on the search path.
    ///
    /// Raised before anything else runs when `cmake` cannot be located.
    #[error("Required tool '{tool}' was not found on PATH")]
    #[diagnostic(
        code(cmake_hold::env::tool_not_found),
        help("Install {tool} and make sure it is on PATH before building.")
    )]
    ToolNotFound {
        /// Name of the missing executable
        tool: String,
        /// The lookup error
        #[source]
        source: which::Error,
    },

    /// The configure or build step exited unsuccessfully.
    ///
    /// `code` is `None` when the process was terminated by a signal.
    #[error("The {step} step failed{}", status_suffix(.code))]
    #[diagnostic(
        code(cmake_hold::step::failed),
        help("See the tool output above. Pass --force-reconfigure to start from a clean configure.")
    )]
    StepFailed {
        /// Which step failed
        step: Step,
        /// Exit status reported by the process
        code: Option<i32>,
    },

    /// File system I/O error.
    #[error("I/O error accessing '{path}'")]
    #[diagnostic(code(cmake_hold::io_error))]
    IoError {
        /// The path that caused the I/O error
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a directory needed for an output file.
    #[error("Failed to create directory '{0}'")]
    #[diagnostic(
        code(cmake_hold::fs::create_dir_error),
        help("Ensure you have write permissions for the parent directory.")
    )]
    CreateDirError(
        /// The directory path that couldn't be created
        PathBuf,
        /// The underlying I/O error
        #[source]
        std::io::Error,
    ),

    /// The argument cache exists but does not hold a valid configuration.
    ///
    /// Raised by `arg_cache::load` only when the cache is eligible for
    /// loading. There is no fallback to default options.
    #[error("Failed to read cached build arguments from '{path}'")]
    #[diagnostic(
        code(cmake_hold::arg_cache::deserialization_error),
        help("Fix or delete the file, or run 'cmake-hold bilge' to reset it.")
    )]
    DeserializationError {
        /// The argument cache file
        path: PathBuf,
        /// The underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Failed to serialize data to JSON.
    #[error("Failed to serialize {what}")]
    #[diagnostic(code(cmake_hold::serialization_error))]
    SerializationError {
        /// What was being serialized
        what: &'static str,
        /// The underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// A per-module compile command database could not be parsed.
    #[error("Invalid compile command database '{path}'")]
    #[diagnostic(
        code(cmake_hold::compile_commands::invalid),
        help("Expected a JSON array of {{directory, command, file}} records.")
    )]
    InvalidCompileDatabase {
        /// The offending file
        path: PathBuf,
        /// The underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The passthrough argument string could not be split into tokens.
    #[error("Invalid extra CMake arguments: {0}")]
    #[diagnostic(
        code(cmake_hold::config::invalid_extra_args),
        help("Check for unbalanced quotes, and pass the value as --cmake-args=\"...\".")
    )]
    InvalidExtraArgs(
        /// The raw argument string
        String,
    ),

    /// Another invocation already holds the build directory lock.
    #[error("Build directory is locked by another process: '{0}'")]
    #[diagnostic(
        code(cmake_hold::lock::busy),
        help("Wait for the other build to finish. Only one build may run per build directory.")
    )]
    BuildDirLocked(
        /// The lock file
        PathBuf,
    ),

    /// Git operation failed while synchronizing submodules.
    #[error("Git error while updating submodules")]
    #[diagnostic(
        code(cmake_hold::git::error),
        help("Pass --no-update-submodules to skip submodule synchronization.")
    )]
    GitError(#[from] git2::Error),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(cmake_hold::config::error),
        help("Check the required configuration parameters.")
    )]
    ConfigError(
        /// Description of the configuration error
        String,
    ),
}

fn status_suffix(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" with exit status {code}"),
        None => " (terminated by signal)".to_string(),
    }
}

impl BuildError {
    /// Process exit code to report for this error.
    ///
    /// A failed external step passes its own exit status through; everything
    /// else exits with 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            BuildError::StepFailed {
                code: Some(code), ..
            } => match u8::try_from(*code) {
                Ok(0) | Err(_) => 1,
                Ok(code) => code,
            },
            _ => 1,
        }
    }
}

/// Type alias for Results in this crate
pub type Result<T> = std::result::Result<T, BuildError>;
