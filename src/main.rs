//! # cmake-hold CLI
//!
//! The command-line interface for cmake-hold, which keeps a CMake-based native
//! build incremental when it is rebuilt over and over from a package build.
//!
//! ## Commands
//!
//! - **anchor**: Main command - restores build options, reconfigures only when
//!   needed, builds, and merges compile_commands.json
//! - **sound**: Reports whether the next build would reconfigure
//! - **splice**: Merges the per-module compile command databases
//! - **bilge**: Clears the cached build options
//!
//! ## Quick Start
//!
//! ```bash
//! # Build with tests; the option is remembered for the next run
//! cmake-hold anchor --build-tests
//!
//! # Rebuild, reconfiguring only if the CMake arguments changed
//! cmake-hold anchor
//! ```
//!
//! ## Environment Variables
//!
//! - `CMAKE_HOLD_PROJECT_ROOT`: Override the project root (default: .)
//! - `CMAKE_HOLD_BUILD_DIR`: Override the build directory (default:
//!   build/native)
//! - `CMAKE_HOLD_ARGS_CACHE_PATH`: Custom argument cache location
//! - `CMAKE_HOLD_VERBOSE`: Enable verbose output
//! - `CMAKE_HOLD_QUIET`: Silence all output except errors
//! - `HEADLESS`: `true` builds without the GUI viewers
//! - `CMAKE_ARGS`: Replaces `--cmake-args`
//!
//! A failed configure or build step exits with the tool's own status code.

use std::io::IsTerminal;
use std::process::ExitCode;

use cmake_hold::cli::Cli;

fn install_report_handler() -> miette::Result<()> {
    // Configure miette handler based on terminal capabilities
    if std::io::stderr().is_terminal() {
        miette::set_hook(Box::new(|_| {
            Box::new(
                miette::GraphicalReportHandler::new()
                    .with_theme(miette::GraphicalTheme::unicode_nocolor())
                    .with_context_lines(3),
            )
        }))?;
    } else {
        // Plain output for CI logs and package installer output
        miette::set_hook(Box::new(|_| {
            Box::new(
                miette::GraphicalReportHandler::new()
                    .with_theme(miette::GraphicalTheme::none())
                    .with_context_lines(0),
            )
        }))?;
    }
    Ok(())
}

fn main() -> ExitCode {
    miette::set_panic_hook();

    if let Err(report) = install_report_handler() {
        eprintln!("{report:?}");
        return ExitCode::FAILURE;
    }

    let cli = Cli::parse_args();

    match cmake_hold::commands::execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            ExitCode::from(code)
        }
    }
}
