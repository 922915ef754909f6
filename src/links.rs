//! Convenience symlinks next to the build directory.
//!
//! Developers run the built utilities from the project's `build/` directory
//! rather than from deep inside the generator's tree, so a successful build
//! links them there.

use std::path::{Path, PathBuf};

use crate::error::{BuildError, Result};

/// A symlink `<link_dir>/<name>` pointing into the build directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLink {
    pub name: &'static str,
    /// Target relative to the build directory.
    pub target: &'static str,
    /// Only linked when the GUI viewers are built.
    pub gui_only: bool,
}

/// Links created after every developer build.
pub const DEFAULT_LINKS: &[OutputLink] = &[
    OutputLink {
        name: "viewer",
        target: "utils/viewer/viewer",
        gui_only: true,
    },
    OutputLink {
        name: "utils",
        target: "utils",
        gui_only: false,
    },
];

/// What happened to one link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    Created(PathBuf),
    AlreadyLinked(PathBuf),
    /// The target wasn't produced by this build.
    MissingTarget(PathBuf),
    /// Skipped because the build is headless.
    Headless,
    /// Symlinks aren't supported on this platform.
    Unsupported,
}

/// Creates every applicable link in `link_dir`.
///
/// An existing symlink is left alone, whatever it points to.
pub fn create_links(
    links: &[OutputLink],
    build_dir: &Path,
    link_dir: &Path,
    headless: bool,
) -> Result<Vec<LinkOutcome>> {
    links
        .iter()
        .map(|link| create_link(link, build_dir, link_dir, headless))
        .collect()
}

fn create_link(
    link: &OutputLink,
    build_dir: &Path,
    link_dir: &Path,
    headless: bool,
) -> Result<LinkOutcome> {
    if link.gui_only && headless {
        return Ok(LinkOutcome::Headless);
    }

    let link_path = link_dir.join(link.name);
    if link_path.is_symlink() {
        return Ok(LinkOutcome::AlreadyLinked(link_path));
    }

    let target = build_dir.join(link.target);
    if !target.exists() {
        return Ok(LinkOutcome::MissingTarget(target));
    }

    symlink(&target, &link_path)
}

#[cfg(unix)]
fn symlink(target: &Path, link_path: &Path) -> Result<LinkOutcome> {
    std::os::unix::fs::symlink(target, link_path).map_err(|source| BuildError::IoError {
        path: link_path.to_path_buf(),
        source,
    })?;
    Ok(LinkOutcome::Created(link_path.to_path_buf()))
}

#[cfg(not(unix))]
fn symlink(_target: &Path, _link_path: &Path) -> Result<LinkOutcome> {
    Ok(LinkOutcome::Unsupported)
}
