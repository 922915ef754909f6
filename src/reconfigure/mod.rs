//! Deciding whether the configure step has to run again.
//!
//! Running the generator is the slow part of a rebuild, and it is only needed
//! when the options it was last run with differ from the ones requested now.
//! CMake records those options in its state file, so the decision compares
//! every requested `-DKEY=VALUE` definition with the recorded entry of the
//! same key.
//!
//! The comparison itself ([`needs_reconfigure`]) is pure; [`should_reconfigure`]
//! adds the file read around it.

use std::path::Path;

use crate::error::Result;

pub mod state;

pub use state::{STATE_FILE_NAME, StateEntry, parse_state, parse_state_bytes, read_state_file};


/// A `-DKEY[:TYPE]=VALUE` definition passed to the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub key: String,
    pub value: String,
}

impl Definition {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Parses a generator argument.
    ///
    /// Returns `None` for generator selection (`-G...`) and for anything that
    /// isn't a definition; those take no part in the comparison. A type
    /// annotation on the key (`-DFOO:BOOL=ON`) is dropped, since the state
    /// file is matched by key alone.
    pub fn parse(arg: &str) -> Option<Self> {
        let body = arg.strip_prefix("-D")?;
        let (key, value) = body.split_once('=')?;
        let key = key.split_once(':').map_or(key, |(key, _)| key);
        if key.is_empty() {
            return None;
        }
        Some(Self::new(key, value))
    }
}

/// Extracts the comparable definitions from a list of generator arguments.
pub fn requested_definitions<S: AsRef<str>>(args: &[S]) -> Vec<Definition> {
    args.iter()
        .filter_map(|arg| Definition::parse(arg.as_ref()))
        .collect()
}

/// Why a reconfigure is (or isn't) needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// `--force-reconfigure` was given.
    Forced,
    /// The generator has never run in this build directory.
    NoState,
    /// A requested definition differs from the recorded one.
    Changed {
        key: String,
        recorded: String,
        requested: String,
    },
    /// Every requested definition matches the recorded state.
    UpToDate,
}

impl Verdict {
    pub fn requires_reconfigure(&self) -> bool {
        !matches!(self, Verdict::UpToDate)
    }

    /// Short human-readable reason.
    pub fn describe(&self) -> String {
        match self {
            Verdict::Forced => "reconfigure forced".to_string(),
            Verdict::NoState => "no previous configuration".to_string(),
            Verdict::Changed {
                key,
                recorded,
                requested,
            } => format!("{key} changed from '{recorded}' to '{requested}'"),
            Verdict::UpToDate => "configuration unchanged".to_string(),
        }
    }
}

/// Compares the requested definitions against the recorded state.
///
/// `state` is `None` when the state file doesn't exist. A requested key with
/// no recorded entry is not treated as a change.
pub fn evaluate(requested: &[Definition], state: Option<&[StateEntry]>, force: bool) -> Verdict {
    if force {
        return Verdict::Forced;
    }

    let Some(state) = state else {
        return Verdict::NoState;
    };

    for definition in requested {
        let changed = state
            .iter()
            .find(|entry| entry.key == definition.key && entry.value != definition.value);

        if let Some(entry) = changed {
            return Verdict::Changed {
                key: definition.key.clone(),
                recorded: entry.value.clone(),
                requested: definition.value.clone(),
            };
        }
    }

    Verdict::UpToDate
}

/// Returns `true` if the configure step must run.
pub fn needs_reconfigure(
    requested: &[Definition],
    state: Option<&[StateEntry]>,
    force: bool,
) -> bool {
    evaluate(requested, state, force).requires_reconfigure()
}

/// Reads the state file at `state_path` and evaluates `args` against it.
///
/// The file is not read at all when `force` is set.
///
/// # Errors
///
/// Returns an I/O error if the state file exists but cannot be read.
pub fn should_reconfigure<S: AsRef<str>>(
    args: &[S],
    state_path: &Path,
    force: bool,
) -> Result<Verdict> {
    if force {
        return Ok(Verdict::Forced);
    }

    let state = read_state_file(state_path)?;
    let requested = requested_definitions(args);
    Ok(evaluate(&requested, state.as_deref(), false))
}
