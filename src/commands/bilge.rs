//! Bilge command implementation.

use std::path::Path;

use crate::arg_cache;
use crate::error::Result;
use crate::logging::Logger;

/// Executes the bilge command (remove the argument cache).
///
/// Returns whether a cache file was removed.
pub fn bilge(args_cache_path: &Path, verbose: u8, quiet: bool) -> Result<bool> {
    let log = Logger::new(verbose, quiet);
    log.verbose(
        1,
        format!("Bilging out build arguments at {}", args_cache_path.display()),
    );

    let removed = arg_cache::clean(args_cache_path)?;

    if removed {
        log.verbose(1, "Build arguments bilged successfully");
    } else {
        log.verbose(1, "No cached build arguments to remove");
    }

    Ok(removed)
}
