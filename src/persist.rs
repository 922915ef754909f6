//! Small file-writing helpers shared by the argument cache and the compile
//! command database.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::Path;

use crate::error::{BuildError, Result};

/// Creates the parent directory of `path` if it doesn't exist.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|source| BuildError::CreateDirError(parent.to_path_buf(), source))?;
    }
    Ok(())
}

/// Writes `bytes` to `path` atomically.
///
/// The data goes to a sibling temporary file first, which is then renamed
/// over the destination, so readers never see a partially written file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    ensure_parent_dir(path)?;

    let temp_path = path.with_extension("tmp");

    let mut temp_file = File::create(&temp_path).map_err(|source| BuildError::IoError {
        path: temp_path.clone(),
        source,
    })?;

    temp_file
        .write_all(bytes)
        .map_err(|source| BuildError::IoError {
            path: temp_path.clone(),
            source,
        })?;

    temp_file.sync_all().map_err(|source| BuildError::IoError {
        path: temp_path.clone(),
        source,
    })?;

    fs::rename(&temp_path, path).map_err(|source| BuildError::IoError {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

/// Reads a file as UTF-8, returning `None` if it does not exist.
pub fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(source) if source.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(BuildError::IoError {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Reads a file as raw bytes, returning `None` if it does not exist.
pub fn read_optional_bytes(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(source) if source.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(BuildError::IoError {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Removes a file, succeeding if it is already gone.
pub fn remove_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(source) if source.kind() == ErrorKind::NotFound => Ok(false),
        Err(source) => Err(BuildError::IoError {
            path: path.to_path_buf(),
            source,
        }),
    }
}
