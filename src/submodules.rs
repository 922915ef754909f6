//! Git submodule synchronization before the configure step.

use std::path::Path;

use git2::Repository;

use crate::error::Result;

/// Opens the repository containing `path`, if any.
///
/// Returns `None` when `path` is not inside a git work tree (for example an
/// unpacked source archive) or the repository is bare.
pub fn discover_repo(path: &Path) -> Option<Repository> {
    let repo = Repository::discover(path).ok()?;
    repo.workdir()?;
    Some(repo)
}

/// Initializes and updates every submodule, recursively.
///
/// Returns the number of submodules updated.
pub fn update_submodules(repo: &Repository) -> Result<usize> {
    let mut updated = 0;

    for mut submodule in repo.submodules()? {
        submodule.update(true, None)?;
        updated += 1;

        let nested = submodule.open()?;
        updated += update_submodules(&nested)?;
    }

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_discover_repo_outside_git() {
        let temp_dir = TempDir::new().unwrap();
        // A temp dir may itself live inside a checkout on some machines
        if Repository::discover(temp_dir.path()).is_err() {
            assert!(discover_repo(temp_dir.path()).is_none());
        }
    }

    #[test]
    fn test_update_without_submodules() {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path()).unwrap();
        fs::write(temp_dir.path().join("CMakeLists.txt"), "project(x)").unwrap();

        let found = discover_repo(temp_dir.path()).unwrap();
        assert_eq!(
            found.workdir().unwrap().canonicalize().unwrap(),
            temp_dir.path().canonicalize().unwrap()
        );
        assert_eq!(update_submodules(&repo).unwrap(), 0);
    }
}
