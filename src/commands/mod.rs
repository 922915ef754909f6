//! Implementation of cmake-hold subcommands.
//!
//! The main entry point is [`execute`], which resolves the [`Layout`] and
//! dispatches to the command modules (`anchor`, `sound`, `splice`, `bilge`).
//!
//! # Example
//!
//! ```no_run
//! use cmake_hold::cli::Cli;
//! use cmake_hold::commands;
//!
//! let cli = Cli::parse_args();
//! if let Err(e) = commands::execute(&cli) {
//!     eprintln!("Error: {e:?}");
//! }
//! ```

use std::path::{Path, PathBuf};

use crate::cli::{Cli, Commands};
use crate::config::{BuildConfiguration, Invocation};
use crate::error::{BuildError, Result};
use crate::layout::Layout;
use crate::plan::Host;
use crate::toolchain::CMake;

pub(crate) mod anchor;
pub(crate) mod bilge;
pub(crate) mod sound;
pub(crate) mod splice;

pub use anchor::{Anchor, AnchorBuilder, AnchorReport};
pub use bilge::bilge;
pub use sound::sound;
pub use splice::splice;


/// Execute commands based on the parsed CLI arguments.
pub fn execute(cli: &Cli) -> Result<()> {
    execute_with_dir(cli, None)
}

/// Execute commands with an explicit working directory.
///
/// `anchor` locates `cmake` on `PATH` before doing anything else.
pub fn execute_with_dir(cli: &Cli, working_dir: Option<&Path>) -> Result<()> {
    let quiet = cli.global_opts().quiet();
    let verbose = if quiet {
        0
    } else {
        cli.global_opts().verbose()
    };

    let current_dir = if let Some(dir) = working_dir {
        dir.to_path_buf()
    } else {
        std::env::current_dir().map_err(|source| BuildError::IoError {
            path: PathBuf::from("."),
            source,
        })?
    };

    let layout = Layout::resolve(cli.global_opts(), &current_dir);

    match cli.command() {
        Commands::Anchor { build, toolchain } => {
            let cmake = CMake::locate()?;
            Anchor::builder()
                .layout(&layout)
                .config(BuildConfiguration::from(build).with_process_env())
                .toolchain_opts(toolchain)
                .host(Host::detect(toolchain))
                .invocation(Invocation::from_process_env(toolchain.installer))
                .verbose(verbose)
                .quiet(quiet)
                .build()?
                .run(&cmake)
                .map(|_| ())
        }
        Commands::Sound { build, toolchain } => sound(
            &layout,
            BuildConfiguration::from(build).with_process_env(),
            toolchain,
            &Host::detect(toolchain),
            &Invocation::from_process_env(toolchain.installer),
            verbose,
            quiet,
        )
        .map(|_| ()),
        Commands::Splice => splice(&layout, verbose, quiet).map(|_| ()),
        Commands::Bilge => bilge(&layout.args_cache_path, verbose, quiet).map(|_| ()),
    }
}
