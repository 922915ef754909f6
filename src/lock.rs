//! Exclusive lock on a build directory.
//!
//! The argument cache and compile command database are rewritten at the end
//! of a build, so two builds against one build directory would race on
//! them. The lock is held for a whole invocation.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::{BuildError, Result};
use crate::persist::ensure_parent_dir;

/// Held lock; released when dropped.
#[derive(Debug)]
pub struct BuildDirLock {
    _file: File,
    path: PathBuf,
}

impl BuildDirLock {
    /// Takes the lock at `path` without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::BuildDirLocked`] if another process holds it.
    pub fn acquire(path: &Path) -> Result<Self> {
        ensure_parent_dir(path)?;

        // The lock file is never removed: unlinking it while another process
        // holds it would let a third process lock a fresh inode.
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(|source| BuildError::IoError {
                path: path.to_path_buf(),
                source,
            })?;

        if file.try_lock_exclusive().is_err() {
            return Err(BuildError::BuildDirLocked(path.to_path_buf()));
        }

        Ok(Self {
            _file: file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
