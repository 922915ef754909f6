//! Persistence of build options between invocations.
//!
//! After a successful build the effective [`BuildConfiguration`] is written
//! to a small JSON file in the build directory. The next invocation reads it
//! back and [`merge`]s it over the options given on the command line, so a
//! developer doesn't have to repeat `--headless --cmake-args=...` on every
//! rebuild.
//!
//! Keys in the blacklist (see [`crate::config::default_blacklist`]) are
//! written like every other key but never restored.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use serde::Serialize;
use serde::de::Error as _;

use crate::config::{BuildConfiguration, ConfigKey, Invocation, PersistedConfiguration};
use crate::error::{BuildError, Result};
use crate::persist::{read_optional, remove_if_exists, write_atomic};


/// Default file name of the argument cache inside the build directory.
pub const ARG_CACHE_FILE_NAME: &str = "cmake-hold-args.json";

/// Why the argument cache is not used for this invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisabledReason {
    /// `--no-cached-args` was given.
    SkippedByFlag,
    /// The build is driven by a package installer.
    InstallerInvocation,
}

impl fmt::Display for DisabledReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisabledReason::SkippedByFlag => f.write_str("disabled by --no-cached-args"),
            DisabledReason::InstallerInvocation => f.write_str("disabled for installer builds"),
        }
    }
}

/// Whether the argument cache is read and written for this invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    Enabled,
    Disabled(DisabledReason),
}

impl CacheMode {
    /// Decides the cache mode from the command-line options, before any
    /// cached values are applied.
    pub fn for_invocation(config: &BuildConfiguration, invocation: &Invocation) -> Self {
        if config.skip_cached_args {
            CacheMode::Disabled(DisabledReason::SkippedByFlag)
        } else if invocation.installer {
            CacheMode::Disabled(DisabledReason::InstallerInvocation)
        } else {
            CacheMode::Enabled
        }
    }

    pub fn is_enabled(self) -> bool {
        matches!(self, CacheMode::Enabled)
    }
}

/// Loads the cached configuration.
///
/// Returns `None` when the cache is disabled or the file doesn't exist.
///
/// # Errors
///
/// Returns [`BuildError::DeserializationError`] if the file exists but is not
/// a JSON object with correctly typed values, and an I/O error if it cannot
/// be read.
pub fn load(path: &Path, mode: CacheMode) -> Result<Option<PersistedConfiguration>> {
    if !mode.is_enabled() {
        return Ok(None);
    }

    let Some(contents) = read_optional(path)? else {
        return Ok(None);
    };

    let to_error = |source| BuildError::DeserializationError {
        path: path.to_path_buf(),
        source,
    };

    // Structs also deserialize from arrays, so insist on an object first
    let value: serde_json::Value = serde_json::from_str(&contents).map_err(to_error)?;
    if !value.is_object() {
        return Err(to_error(serde_json::Error::custom(
            "expected a JSON object of build options",
        )));
    }

    serde_json::from_value(value).map(Some).map_err(to_error)
}

/// Overlays `persisted` on top of `current`.
///
/// Every key present in `persisted` and not in `blacklist` replaces the
/// current value. Blacklisted keys and keys missing from `persisted` keep the
/// value from `current`.
pub fn merge(
    current: BuildConfiguration,
    persisted: &PersistedConfiguration,
    blacklist: &BTreeSet<ConfigKey>,
) -> BuildConfiguration {
    let mut merged = current;
    let restorable = |key: ConfigKey| !blacklist.contains(&key);

    overlay(
        &mut merged.build_tests,
        &persisted.build_tests,
        restorable(ConfigKey::BuildTests),
    );
    overlay(
        &mut merged.extra_args,
        &persisted.extra_args,
        restorable(ConfigKey::ExtraArgs),
    );
    overlay(
        &mut merged.force_reconfigure,
        &persisted.force_reconfigure,
        restorable(ConfigKey::ForceReconfigure),
    );
    overlay(
        &mut merged.headless,
        &persisted.headless,
        restorable(ConfigKey::Headless),
    );
    overlay(
        &mut merged.skip_cached_args,
        &persisted.skip_cached_args,
        restorable(ConfigKey::SkipCachedArgs),
    );
    overlay(
        &mut merged.skip_submodule_update,
        &persisted.skip_submodule_update,
        restorable(ConfigKey::SkipSubmoduleUpdate),
    );

    merged
}

fn overlay<T: Clone>(slot: &mut T, value: &Option<T>, restorable: bool) {
    if restorable && let Some(value) = value {
        *slot = value.clone();
    }
}

/// Serializes a configuration the way it is stored on disk: every key,
/// sorted, indented by four spaces.
pub fn to_json(config: &BuildConfiguration) -> Result<String> {
    let to_error = |source| BuildError::SerializationError {
        what: "build arguments",
        source,
    };

    // Going through Value sorts the keys regardless of field order
    let value = serde_json::to_value(config).map_err(to_error)?;

    let mut bytes = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
    value.serialize(&mut serializer).map_err(to_error)?;

    String::from_utf8(bytes).map_err(|e| BuildError::ConfigError(e.to_string()))
}

/// Writes the full configuration to `path`, replacing any previous content.
///
/// Creates the parent directory if needed.
pub fn save(path: &Path, config: &BuildConfiguration) -> Result<()> {
    let json = to_json(config)?;
    write_atomic(path, json.as_bytes())
}

/// Removes the argument cache. Returns whether a file was removed.
pub fn clean(path: &Path) -> Result<bool> {
    remove_if_exists(path)
}
