//! Reader for the generator's own state file (`CMakeCache.txt`).
//!
//! The file is owned by CMake. Lines look like
//!
//! ```text
//! // comment describing the entry
//! CMAKE_BUILD_TYPE:STRING=RelWithDebInfo
//! ```
//!
//! Only `identifier[:type]=value` lines are kept; everything else (comments,
//! blank lines, keys containing characters outside `\w`, lines that aren't
//! valid UTF-8) is skipped.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::Result;
use crate::persist::read_optional_bytes;

/// Default file name of the generator state file inside the build directory.
pub const STATE_FILE_NAME: &str = "CMakeCache.txt";

/// One `key[:type]=value` line of the state file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateEntry {
    pub key: String,
    pub type_tag: Option<String>,
    /// Everything after the first `=`, which may itself contain `=`.
    pub value: String,
}

impl StateEntry {
    /// Parses one line, returning `None` if it doesn't match the grammar.
    pub fn parse(line: &str) -> Option<Self> {
        static ENTRY_RE: OnceLock<Regex> = OnceLock::new();
        let re = ENTRY_RE.get_or_init(|| {
            Regex::new(r"^(?P<key>\w+)(?::(?P<type>\w+))?=(?P<value>.*)$")
                .expect("state entry regex should compile")
        });

        let captures = re.captures(line)?;
        Some(Self {
            key: captures["key"].to_string(),
            type_tag: captures.name("type").map(|m| m.as_str().to_string()),
            value: captures["value"].to_string(),
        })
    }
}

/// Parses the full contents of a state file, in file order.
pub fn parse_state(contents: &str) -> Vec<StateEntry> {
    contents.lines().filter_map(StateEntry::parse).collect()
}

/// Parses raw state file contents.
///
/// CMake writes paths in whatever encoding the system uses, so a line that
/// isn't UTF-8 is skipped on its own.
pub fn parse_state_bytes(contents: &[u8]) -> Vec<StateEntry> {
    contents
        .split(|&byte| byte == b'\n')
        .filter_map(|line| std::str::from_utf8(line).ok())
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter_map(StateEntry::parse)
        .collect()
}

/// Reads and parses the state file, returning `None` if it doesn't exist.
pub fn read_state_file(path: &Path) -> Result<Option<Vec<StateEntry>>> {
    Ok(read_optional_bytes(path)?.map(|contents| parse_state_bytes(&contents)))
}
