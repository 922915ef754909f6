use std::collections::HashMap;
use std::ffi::OsString;

use super::*;

fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn test_config_key_round_trip() {
    for key in ConfigKey::ALL {
        assert_eq!(key.as_str().parse::<ConfigKey>().unwrap(), key);
    }
    assert!("force_cmake".parse::<ConfigKey>().is_err());
}

#[test]
fn test_default_blacklist_only_holds_force() {
    let blacklist = default_blacklist();
    assert_eq!(blacklist.len(), 1);
    assert!(blacklist.contains(&ConfigKey::ForceReconfigure));
}

#[test]
fn test_headless_env_overrides_flag() {
    let config = BuildConfiguration::default().with_env_overrides(env(&[("HEADLESS", "True")]));
    assert!(config.headless);

    let config = BuildConfiguration::default().with_env_overrides(env(&[("HEADLESS", "1")]));
    assert!(!config.headless);
}

#[test]
fn test_headless_env_never_clears_flag() {
    let config = BuildConfiguration {
        headless: true,
        ..Default::default()
    }
    .with_env_overrides(env(&[("HEADLESS", "false")]));
    assert!(config.headless);
}

#[test]
fn test_extra_args_env_replaces_flag() {
    let config = BuildConfiguration {
        extra_args: "-DFROM_FLAG=ON".to_string(),
        ..Default::default()
    }
    .with_env_overrides(env(&[("CMAKE_ARGS", "-DFROM_ENV=ON")]));
    assert_eq!(config.extra_args, "-DFROM_ENV=ON");

    // An empty variable still counts as present
    let config = BuildConfiguration {
        extra_args: "-DFROM_FLAG=ON".to_string(),
        ..Default::default()
    }
    .with_env_overrides(env(&[("CMAKE_ARGS", "")]));
    assert_eq!(config.extra_args, "");
}

#[test]
fn test_no_env_leaves_config_alone() {
    let original = BuildConfiguration {
        build_tests: true,
        extra_args: "-DX=1".to_string(),
        ..Default::default()
    };
    let config = original.clone().with_env_overrides(env(&[]));
    assert_eq!(config, original);
}

#[test]
fn test_persisted_configuration_ignores_unknown_keys() {
    let persisted: PersistedConfiguration =
        serde_json::from_str(r#"{"headless": true, "something_new": 3}"#).unwrap();
    assert_eq!(persisted.headless, Some(true));
    assert_eq!(persisted.build_tests, None);
}

#[test]
fn test_persisted_configuration_rejects_null() {
    let result = serde_json::from_str::<PersistedConfiguration>(r#"{"headless": null}"#);
    assert!(result.is_err());

    let empty: PersistedConfiguration = serde_json::from_str("{}").unwrap();
    assert_eq!(empty, PersistedConfiguration::default());
}

#[test]
fn test_invocation_detects_pip() {
    let detect = |launcher: &str| {
        let launcher = OsString::from(launcher);
        Invocation::detect(move |name| (name == "_").then(|| launcher.clone()))
    };

    assert!(detect("/usr/local/bin/pip").installer);
    assert!(detect("/home/me/.venv/bin/pip3").installer);
    assert!(!detect("/usr/bin/python3").installer);
    assert!(!detect("/usr/bin/cmake-hold").installer);
}

#[test]
fn test_invocation_without_launcher_is_not_installer() {
    let invocation = Invocation::detect(|_| None);
    assert!(!invocation.installer);
    assert!(Invocation::from_process_env(true).installer);
}
