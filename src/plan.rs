//! Arguments and environment for the configure and build steps.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::{ToolchainOpts, normalize_path};
use crate::config::{BuildConfiguration, Invocation};
use crate::error::{BuildError, Result};
use crate::layout::Layout;
use crate::toolchain;

/// Compiler flags variable extended with the version definition.
pub const CXXFLAGS_ENV: &str = "CXXFLAGS";

/// `CMAKE_BUILD_TYPE` of the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildType {
    Debug,
    RelWithDebInfo,
}

impl BuildType {
    pub fn from_debug(debug: bool) -> Self {
        if debug {
            BuildType::Debug
        } else {
            BuildType::RelWithDebInfo
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::RelWithDebInfo => "RelWithDebInfo",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the machine running the build provides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Host {
    /// `ninja` is on `PATH`.
    pub ninja: bool,
    /// Interpreter handed to the generator.
    pub interpreter: Option<PathBuf>,
    /// Inherited value of [`CXXFLAGS_ENV`].
    pub cxxflags: Option<String>,
}

impl Host {
    /// Probes `PATH` and the process environment.
    ///
    /// An interpreter given on the command line wins over the one on `PATH`.
    pub fn detect(opts: &ToolchainOpts) -> Self {
        Self {
            ninja: toolchain::has_ninja(),
            interpreter: opts
                .interpreter
                .clone()
                .or_else(toolchain::default_interpreter),
            cxxflags: std::env::var(CXXFLAGS_ENV).ok(),
        }
    }
}

/// Everything needed to run the configure and build steps once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub build_type: BuildType,
    /// Arguments for the configure step, in order.
    pub generator_args: Vec<String>,
    /// Arguments for the build step.
    pub build_args: Vec<String>,
    /// Variables set on top of the inherited environment when configuring.
    pub env: BTreeMap<String, String>,
}

impl BuildPlan {
    /// Assembles the plan for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidExtraArgs`] if the passthrough argument
    /// string has unbalanced quotes.
    pub fn assemble(
        config: &BuildConfiguration,
        opts: &ToolchainOpts,
        layout: &Layout,
        host: &Host,
        invocation: &Invocation,
    ) -> Result<Self> {
        let build_type = BuildType::from_debug(opts.debug);
        let library_dir = match &opts.library_output_dir {
            Some(dir) => normalize_path(&layout.project_root, dir),
            None => layout.build_dir.join("lib"),
        };

        let mut generator_args = vec![define(
            "CMAKE_LIBRARY_OUTPUT_DIRECTORY",
            library_dir.display(),
        )];
        if let Some(interpreter) = &host.interpreter {
            generator_args.push(define("PYTHON_EXECUTABLE", interpreter.display()));
        }
        generator_args.push(define(
            "CMAKE_EXPORT_COMPILE_COMMANDS",
            on_off(!invocation.installer),
        ));
        generator_args.extend(split_extra_args(&config.extra_args)?);
        generator_args.push(define("CMAKE_BUILD_TYPE", build_type));
        if host.ninja {
            generator_args.push("-GNinja".to_string());
        }
        generator_args.push(define("BUILD_GUI_VIEWERS", on_off(!config.headless)));
        generator_args.push(define("BUILD_TESTS", on_off(config.build_tests)));

        let mut build_args = vec!["--config".to_string(), build_type.to_string()];
        if !host.ninja {
            build_args.push("--parallel".to_string());
        }

        let mut env = BTreeMap::new();
        if let Some(version) = &opts.version_info {
            env.insert(
                CXXFLAGS_ENV.to_string(),
                version_cxxflags(host.cxxflags.as_deref(), version),
            );
        }

        Ok(Self {
            source_dir: normalize_path(&layout.project_root, &opts.source_dir),
            build_dir: layout.build_dir.clone(),
            build_type,
            generator_args,
            build_args,
            env,
        })
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }
}

/// Splits the passthrough argument string the way a POSIX shell would.
pub fn split_extra_args(extra_args: &str) -> Result<Vec<String>> {
    shlex::split(extra_args).ok_or_else(|| BuildError::InvalidExtraArgs(extra_args.to_string()))
}

fn define(key: &str, value: impl fmt::Display) -> String {
    format!("-D{key}={value}")
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "ON" } else { "OFF" }
}

fn version_cxxflags(inherited: Option<&str>, version: &str) -> String {
    let definition = format!(r#"-DVERSION_INFO=\"{version}\""#);
    match inherited {
        Some(flags) if !flags.trim().is_empty() => format!("{flags} {definition}"),
        _ => definition,
    }
}
