//! Command-line interface definitions for cmake-hold.
//!
//! This module defines the CLI structure using clap, including all subcommands
//! and their arguments. The main entry point is the [`Cli`] struct.
//!
//! # Example
//!
//! ```no_run
//! use cmake_hold::cli::{Cli, Commands};
//!
//! let cli = Cli::parse_args();
//!
//! match cli.command() {
//!     Commands::Anchor { build, .. } => {
//!         println!("Building, headless: {}", build.headless);
//!     }
//!     _ => {}
//! }
//! ```

use std::path::{Component, Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::config::BuildConfiguration;
use crate::error::{BuildError, Result};


/// Main command-line interface for cmake-hold.
///
/// Global options locate the project and its build directory; the subcommand
/// selects what to do with them.
#[derive(Debug, Parser)]
#[command(
    name = "cmake-hold",
    bin_name = "cmake-hold",
    author,
    version,
    about = "Keeps native CMake builds incremental between invocations",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    global_opts: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

/// Global options that apply to all cmake-hold commands.
#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Project root; the merged compile_commands.json is written here
    #[arg(
        long,
        global = true,
        default_value = ".",
        env = "CMAKE_HOLD_PROJECT_ROOT"
    )]
    project_root: PathBuf,

    /// Native build directory, relative to the project root
    #[arg(
        long,
        global = true,
        default_value = "build/native",
        env = "CMAKE_HOLD_BUILD_DIR"
    )]
    build_dir: PathBuf,

    /// Path to the argument cache (defaults to
    /// `<build-dir>/cmake-hold-args.json`)
    #[arg(long, global = true, env = "CMAKE_HOLD_ARGS_CACHE_PATH")]
    args_cache_path: Option<PathBuf>,

    /// Enable verbose output (use multiple times for more verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count, env = "CMAKE_HOLD_VERBOSE")]
    verbose: u8,

    /// Silence all output except for errors
    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "verbose",
        env = "CMAKE_HOLD_QUIET"
    )]
    quiet: bool,
}

impl GlobalOpts {
    /// Get the project root as given
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Get the build directory as given
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Get the argument cache path option
    pub fn args_cache_path(&self) -> Option<&Path> {
        self.args_cache_path.as_deref()
    }

    /// Get the verbose level
    pub fn verbose(&self) -> u8 {
        self.verbose
    }

    /// Check if quiet mode is enabled
    pub fn quiet(&self) -> bool {
        self.quiet
    }
}

/// Build options remembered between invocations.
///
/// These map one-to-one onto [`BuildConfiguration`].
#[derive(Debug, Clone, Default, Args)]
pub struct BuildOpts {
    /// Build without the GUI viewers (also set by HEADLESS=true)
    #[arg(long)]
    pub headless: bool,

    /// Rerun the configure step even if nothing changed
    #[arg(long, visible_aliases = ["force-cmake", "cmake"])]
    pub force_reconfigure: bool,

    /// Build the test targets
    #[arg(long)]
    pub build_tests: bool,

    /// Extra arguments for the configure step, as one string (also set by
    /// CMAKE_ARGS). Pass it as --cmake-args="..."
    #[arg(long = "cmake-args", default_value = "", allow_hyphen_values = true)]
    pub extra_args: String,

    /// Don't update git submodules
    #[arg(long = "no-update-submodules")]
    pub skip_submodule_update: bool,

    /// Neither restore nor save the cached build arguments
    #[arg(long = "no-cached-args")]
    pub skip_cached_args: bool,
}

impl From<&BuildOpts> for BuildConfiguration {
    fn from(opts: &BuildOpts) -> Self {
        BuildConfiguration {
            build_tests: opts.build_tests,
            extra_args: opts.extra_args.clone(),
            force_reconfigure: opts.force_reconfigure,
            headless: opts.headless,
            skip_cached_args: opts.skip_cached_args,
            skip_submodule_update: opts.skip_submodule_update,
        }
    }
}

/// Options describing how the toolchain is driven. Not cached.
#[derive(Debug, Clone, Default, Args)]
pub struct ToolchainOpts {
    /// Directory holding the top-level CMakeLists.txt, relative to the
    /// project root
    #[arg(long, default_value = "src", env = "CMAKE_HOLD_SOURCE_DIR")]
    pub source_dir: PathBuf,

    /// Where built libraries are placed (defaults to `<build-dir>/lib`)
    #[arg(long, env = "CMAKE_HOLD_LIBRARY_OUTPUT_DIR")]
    pub library_output_dir: Option<PathBuf>,

    /// Interpreter passed as PYTHON_EXECUTABLE (defaults to python3 on PATH)
    #[arg(long, env = "CMAKE_HOLD_INTERPRETER")]
    pub interpreter: Option<PathBuf>,

    /// Build with CMAKE_BUILD_TYPE=Debug instead of RelWithDebInfo
    #[arg(long)]
    pub debug: bool,

    /// Version string compiled in as VERSION_INFO
    #[arg(long, env = "CMAKE_HOLD_VERSION_INFO")]
    pub version_info: Option<String>,

    /// Treat this as a package-installer build (detected from `_` otherwise)
    #[arg(long, env = "CMAKE_HOLD_INSTALLER")]
    pub installer: bool,
}

/// Available cmake-hold subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Anchor the native build (the main command)
    ///
    /// Restores cached build arguments, reconfigures only when the requested
    /// options differ from the generator's recorded state, builds, merges
    /// compile_commands.json, and saves the arguments for next time.
    Anchor {
        #[command(flatten)]
        build: BuildOpts,

        #[command(flatten)]
        toolchain: ToolchainOpts,
    },

    /// Take a sounding: report whether the next build would reconfigure
    ///
    /// Runs the same argument restore and comparison as `anchor` without
    /// running any tool or writing any file.
    Sound {
        #[command(flatten)]
        build: BuildOpts,

        #[command(flatten)]
        toolchain: ToolchainOpts,
    },

    /// Splice the per-module compile command databases into one
    ///
    /// Rewrites `<project-root>/compile_commands.json` only when its content
    /// changes.
    Splice,

    /// Bilge out the cached build arguments
    ///
    /// The next build starts from the command-line options alone.
    Bilge,
}

impl Cli {
    /// Get the global options
    pub fn global_opts(&self) -> &GlobalOpts {
        &self.global_opts
    }

    /// Get the command
    pub fn command(&self) -> &Commands {
        &self.command
    }

    /// Create a builder for programmatic construction
    pub fn builder() -> CliBuilder {
        CliBuilder::default()
    }

    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Builder for [`Cli`]
#[derive(Debug, Default)]
pub struct CliBuilder {
    project_root: Option<PathBuf>,
    build_dir: Option<PathBuf>,
    args_cache_path: Option<PathBuf>,
    verbose: u8,
    quiet: bool,
    command: Option<Commands>,
}

impl CliBuilder {
    /// Set the project root
    pub fn project_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.project_root = Some(dir.into());
        self
    }

    /// Set the build directory
    pub fn build_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.build_dir = Some(dir.into());
        self
    }

    /// Set the argument cache path
    pub fn args_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.args_cache_path = Some(path.into());
        self
    }

    /// Set the verbose level
    pub fn verbose(mut self, level: u8) -> Self {
        self.verbose = level;
        self
    }

    /// Enable quiet mode
    pub fn quiet(mut self, enabled: bool) -> Self {
        self.quiet = enabled;
        self
    }

    /// Set the command
    pub fn command(mut self, command: Commands) -> Self {
        self.command = Some(command);
        self
    }

    /// Build the Cli instance
    pub fn build(self) -> Result<Cli> {
        let command = self
            .command
            .ok_or_else(|| BuildError::ConfigError("Command is required".to_string()))?;

        Ok(Cli {
            global_opts: GlobalOpts {
                project_root: self.project_root.unwrap_or_else(|| PathBuf::from(".")),
                build_dir: self
                    .build_dir
                    .unwrap_or_else(|| PathBuf::from("build/native")),
                args_cache_path: self.args_cache_path,
                verbose: self.verbose,
                quiet: self.quiet,
            },
            command,
        })
    }
}

/// Resolve `path` against `base` and clean it, without requiring it to
/// exist.
///
/// - Relative paths are joined onto `base`
/// - `.` components are dropped and `..` pops the previous component
/// - Symlinks are not resolved
pub fn normalize_path(base: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();

    let absolute = if path.is_relative() {
        base.join(path)
    } else {
        path.to_path_buf()
    };

    let mut components = Vec::new();
    for component in absolute.components() {
        match component {
            Component::ParentDir => {
                if let Some(last) = components.last()
                    && !matches!(last, Component::ParentDir | Component::RootDir)
                {
                    components.pop();
                    continue;
                }
                components.push(component);
            }
            Component::CurDir => continue,
            _ => components.push(component),
        }
    }

    components.into_iter().collect()
}
