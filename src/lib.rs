//! # cmake-hold
//!
//! Keeps a CMake-based native build incremental when it is driven from a
//! Python package build.
//!
//! ## Overview
//!
//! Every invocation of a package build would normally rerun CMake's configure
//! step, which invalidates much of the native build. cmake-hold remembers the
//! build options between invocations, compares the options it is about to
//! pass against the ones CMake recorded in `CMakeCache.txt`, and only
//! reconfigures when they differ. After building it merges the per-module
//! `compile_commands.json` files into one database at the project root for
//! editors and static analyzers.
//!
//! ## Architecture
//!
//! - [`arg_cache`]: persists and restores build options, skipping volatile
//!   ones such as a forced reconfigure
//! - [`reconfigure`]: decides whether the configure step must run
//! - [`compile_commands`]: merges and normalizes compile command databases
//! - [`plan`]: assembles the arguments handed to CMake
//! - [`commands`]: the `anchor` orchestrator and the auxiliary commands
//! - [`cli`], [`config`], [`layout`]: options and the paths derived from them
//! - [`toolchain`]: the external configure and build steps
//! - [`links`]: convenience symlinks next to the build directory
//! - [`error`]: error types and handling with thiserror + miette
//!
//! Internal modules (not part of the public API):
//! - `lock`: exclusive build directory lock
//! - `submodules`: git submodule synchronization
//! - `persist`: atomic file writes
//! - `logging`: stderr reporting
//!
//! ## Library Usage
//!
//! ```no_run
//! use cmake_hold::cli::{Cli, Commands};
//! use cmake_hold::commands;
//!
//! let cli = Cli::builder()
//!     .build_dir("build/native")
//!     .verbose(1)
//!     .command(Commands::Splice)
//!     .build()?;
//!
//! commands::execute(&cli)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The decision itself is a pure function:
//!
//! ```
//! use cmake_hold::reconfigure::{Definition, needs_reconfigure, parse_state};
//!
//! let state = parse_state("A:STRING=1\nB:STRING=2\n");
//! let requested = [Definition::new("A", "1"), Definition::new("B", "2")];
//! assert!(!needs_reconfigure(&requested, Some(state.as_slice()), false));
//! assert!(needs_reconfigure(&requested, None, false));
//! ```

pub mod arg_cache;
pub mod cli;
pub mod commands;
pub mod compile_commands;
pub mod config;
pub mod error;
pub mod layout;
pub mod links;
pub mod plan;
pub mod reconfigure;
pub mod toolchain;

// Internal modules
mod lock;
mod logging;
mod persist;
mod submodules;
