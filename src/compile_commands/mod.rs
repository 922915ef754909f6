//! Merging per-module compile command databases into one.
//!
//! Each native module built under the build tree exports its own
//! `compile_commands.json`. Editors and static analyzers expect a single
//! database at the project root, so this module concatenates them, rewrites
//! C-compiler invocations to the matching C++ front end, and writes the
//! result only when it differs from what is already on disk.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{BuildError, Result};
use crate::persist::{read_optional, write_atomic};


/// File name of a compile command database.
pub const COMPILE_COMMANDS_FILE_NAME: &str = "compile_commands.json";

/// C compiler front ends and the C++ front end that replaces them.
const FRONT_END_REWRITES: &[(&str, &str)] = &[("gcc", "g++")];

/// One compiled translation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileCommandRecord {
    pub directory: String,
    pub command: String,
    pub file: String,
    /// Any other fields (`output`, `arguments`, ...) carried through as-is.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl CompileCommandRecord {
    pub fn new(
        directory: impl Into<String>,
        command: impl Into<String>,
        file: impl Into<String>,
    ) -> Self {
        Self {
            directory: directory.into(),
            command: command.into(),
            file: file.into(),
            extra: BTreeMap::new(),
        }
    }
}

/// Rewrites a leading C compiler token to its C++ counterpart.
///
/// Only an exact token match followed by a space is rewritten; the rest of
/// the command is left untouched.
pub fn normalize_command(command: &str) -> Cow<'_, str> {
    for (c_front_end, cxx_front_end) in FRONT_END_REWRITES {
        if let Some(rest) = command
            .strip_prefix(c_front_end)
            .and_then(|rest| rest.strip_prefix(' '))
        {
            return Cow::Owned(format!("{cxx_front_end} {rest}"));
        }
    }
    Cow::Borrowed(command)
}

/// Concatenates record lists in order and normalizes every command.
///
/// No sorting and no deduplication: the output order is the input order.
pub fn merge_records<I>(sources: I) -> Vec<CompileCommandRecord>
where
    I: IntoIterator<Item = Vec<CompileCommandRecord>>,
{
    sources
        .into_iter()
        .flatten()
        .map(|mut record| {
            if let Cow::Owned(normalized) = normalize_command(&record.command) {
                record.command = normalized;
            }
            record
        })
        .collect()
}

/// Serializes records the way the merged database is stored: a JSON array
/// indented by two spaces, without a trailing newline.
pub fn to_json(records: &[CompileCommandRecord]) -> Result<String> {
    serde_json::to_string_pretty(records).map_err(|source| BuildError::SerializationError {
        what: "compile commands",
        source,
    })
}

/// Reads one per-module database.
///
/// # Errors
///
/// Returns [`BuildError::InvalidCompileDatabase`] if the file isn't a JSON
/// array of records.
pub fn load_records(path: &Path) -> Result<Vec<CompileCommandRecord>> {
    let contents = fs::read_to_string(path).map_err(|source| BuildError::IoError {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&contents).map_err(|source| BuildError::InvalidCompileDatabase {
        path: path.to_path_buf(),
        source,
    })
}

/// Databases found below a search root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Database files, in visiting order.
    pub sources: Vec<PathBuf>,
    /// Directories that could not be read and were skipped.
    pub unreadable: Vec<PathBuf>,
}

/// Finds the per-module databases one directory level below `search_root`.
///
/// Directories are visited in file-name order so the merged output is stable
/// across runs. A missing `search_root` yields no files. A module directory
/// that can't be read for lack of permission is recorded in
/// [`Discovery::unreadable`] instead of failing the search.
pub fn discover_sources(search_root: &Path) -> Result<Discovery> {
    let mut discovery = Discovery::default();
    if !search_root.is_dir() {
        return Ok(discovery);
    }

    for entry in WalkDir::new(search_root)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if is_permission_denied(&e) => {
                discovery
                    .unreadable
                    .push(e.path().unwrap_or(search_root).to_path_buf());
                continue;
            }
            Err(e) => {
                let path = e.path().unwrap_or(search_root).to_path_buf();
                return Err(BuildError::IoError {
                    path,
                    source: e.into(),
                });
            }
        };

        if entry.file_type().is_file() && entry.file_name() == COMPILE_COMMANDS_FILE_NAME {
            discovery.sources.push(entry.into_path());
        }
    }

    Ok(discovery)
}

fn is_permission_denied(error: &walkdir::Error) -> bool {
    error
        .io_error()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::PermissionDenied)
}

/// Writes `contents` to `destination` unless it already holds exactly that.
///
/// Returns whether the file was written. Leaving an unchanged file alone
/// keeps its modification time, so file watchers don't fire.
pub fn write_if_changed(destination: &Path, contents: &str) -> Result<bool> {
    if read_optional(destination)?.as_deref() == Some(contents) {
        return Ok(false);
    }

    write_atomic(destination, contents.as_bytes())?;
    Ok(true)
}

/// Result of a merge run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSummary {
    pub sources: Vec<PathBuf>,
    /// Directories skipped because they couldn't be read.
    pub unreadable: Vec<PathBuf>,
    pub records: usize,
    pub written: bool,
}

/// Discovers, merges, normalizes and writes the compile command database.
pub fn merge_into(search_root: &Path, destination: &Path) -> Result<MergeSummary> {
    let Discovery {
        sources,
        unreadable,
    } = discover_sources(search_root)?;

    let loaded = sources
        .iter()
        .map(|path| load_records(path))
        .collect::<Result<Vec<_>>>()?;

    let records = merge_records(loaded);
    let json = to_json(&records)?;
    let written = write_if_changed(destination, &json)?;

    Ok(MergeSummary {
        sources,
        unreadable,
        records: records.len(),
        written,
    })
}
