//! Stderr reporting shared by all commands.

use std::fmt::Display;

/// Verbosity-aware writer for progress and summary lines.
///
/// Everything goes to stderr so stdout stays free for the external tools'
/// own output.
#[derive(Clone, Copy, Debug)]
pub struct Logger {
    verbose: u8,
    quiet: bool,
}

impl Logger {
    pub fn new(verbose: u8, quiet: bool) -> Self {
        // --quiet wins over any -v count
        let verbose = if quiet { 0 } else { verbose };
        Self { verbose, quiet }
    }

    pub fn info(&self, message: impl Display) {
        if !self.quiet {
            eprintln!("{message}");
        }
    }

    pub fn verbose(&self, level: u8, message: impl Display) {
        if !self.quiet && self.verbose >= level {
            eprintln!("{message}");
        }
    }

    /// Indented `label: value` line used in end-of-command summaries.
    pub fn detail(&self, label: &str, value: impl Display) {
        if !self.quiet {
            eprintln!("  {label}: {value}");
        }
    }

    pub fn warn(&self, message: impl Display) {
        if !self.quiet {
            eprintln!("Warning: {message}");
        }
    }

    pub fn quiet(&self) -> bool {
        self.quiet
    }

    pub fn level(&self) -> u8 {
        self.verbose
    }
}
