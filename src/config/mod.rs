//! Build options for a single invocation.
//!
//! [`BuildConfiguration`] is built once from the command line, adjusted by
//! the environment, optionally overlaid with the options remembered from the
//! previous run (see [`crate::arg_cache`]), and then passed explicitly to
//! everything that needs it.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

#[cfg(test)]
mod tests;

/// Environment variable that turns on headless mode when set to `true`.
pub const HEADLESS_ENV: &str = "HEADLESS";

/// Environment variable that replaces the passthrough CMake arguments.
pub const EXTRA_ARGS_ENV: &str = "CMAKE_ARGS";

/// File-name prefixes of package installers that drive a build.
const INSTALLER_PREFIXES: &[&str] = &["pip"];

/// Name of a build option, as stored in the argument cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigKey {
    BuildTests,
    ExtraArgs,
    ForceReconfigure,
    Headless,
    SkipCachedArgs,
    SkipSubmoduleUpdate,
}

impl ConfigKey {
    /// Every key, in the order they appear in the cache file.
    pub const ALL: [ConfigKey; 6] = [
        ConfigKey::BuildTests,
        ConfigKey::ExtraArgs,
        ConfigKey::ForceReconfigure,
        ConfigKey::Headless,
        ConfigKey::SkipCachedArgs,
        ConfigKey::SkipSubmoduleUpdate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::BuildTests => "build_tests",
            ConfigKey::ExtraArgs => "extra_args",
            ConfigKey::ForceReconfigure => "force_reconfigure",
            ConfigKey::Headless => "headless",
            ConfigKey::SkipCachedArgs => "skip_cached_args",
            ConfigKey::SkipSubmoduleUpdate => "skip_submodule_update",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("unknown build option '{s}'"))
    }
}

/// Keys that are never restored from the argument cache.
///
/// A forced reconfigure is a one-shot request; replaying it would force every
/// later build to reconfigure too.
pub fn default_blacklist() -> BTreeSet<ConfigKey> {
    BTreeSet::from([ConfigKey::ForceReconfigure])
}

/// The effective build options for one invocation.
///
/// Field names double as the keys of the argument cache file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfiguration {
    /// Build the test targets.
    pub build_tests: bool,
    /// Extra arguments passed to the configure step, as one shell string.
    pub extra_args: String,
    /// Rerun the configure step even if nothing changed.
    pub force_reconfigure: bool,
    /// Build without the GUI viewers.
    pub headless: bool,
    /// Neither restore nor save the argument cache.
    pub skip_cached_args: bool,
    /// Leave git submodules alone.
    pub skip_submodule_update: bool,
}

impl BuildConfiguration {
    /// Applies [`HEADLESS_ENV`] and [`EXTRA_ARGS_ENV`], which take precedence
    /// over the corresponding command-line flags.
    ///
    /// `lookup` returns the value of an environment variable, if set.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if lookup(HEADLESS_ENV).is_some_and(|value| value.eq_ignore_ascii_case("true")) {
            self.headless = true;
        }
        if let Some(extra_args) = lookup(EXTRA_ARGS_ENV) {
            self.extra_args = extra_args;
        }
        self
    }

    /// Applies overrides from the process environment.
    pub fn with_process_env(self) -> Self {
        self.with_env_overrides(|name| std::env::var(name).ok())
    }
}

/// A configuration as read back from the argument cache.
///
/// Every field is optional: a key missing from the file leaves the current
/// value untouched when merged. Unknown keys are ignored. A key that is
/// present must hold a value of the right type; `null` is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PersistedConfiguration {
    #[serde(default, deserialize_with = "present")]
    pub build_tests: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    pub extra_args: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub force_reconfigure: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    pub headless: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    pub skip_cached_args: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    pub skip_submodule_update: Option<bool>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl From<&BuildConfiguration> for PersistedConfiguration {
    fn from(config: &BuildConfiguration) -> Self {
        Self {
            build_tests: Some(config.build_tests),
            extra_args: Some(config.extra_args.clone()),
            force_reconfigure: Some(config.force_reconfigure),
            headless: Some(config.headless),
            skip_cached_args: Some(config.skip_cached_args),
            skip_submodule_update: Some(config.skip_submodule_update),
        }
    }
}

/// Facts about how the tool was launched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Invocation {
    /// The build is driven by a package installer rather than a developer.
    ///
    /// Installer builds start from a clean slate: no cached arguments, no
    /// compile command export, no output links.
    pub installer: bool,
}

impl Invocation {
    /// Detects an installer from the `_` variable most shells set to the
    /// path of the command being run.
    pub fn detect(lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        let installer = lookup("_")
            .as_deref()
            .and_then(|launcher| Path::new(launcher).file_name())
            .and_then(|name| name.to_str())
            .is_some_and(|name| INSTALLER_PREFIXES.iter().any(|p| name.starts_with(p)));

        Self { installer }
    }

    /// Detects from the process environment, with `forced` overriding the
    /// result when set.
    pub fn from_process_env(forced: bool) -> Self {
        if forced {
            return Self { installer: true };
        }
        Self::detect(|name| std::env::var_os(name))
    }
}
