use std::fs;

use assert_fs::prelude::*;
use cmake_hold::arg_cache::{self, CacheMode};
use cmake_hold::cli::{Cli, Commands, ToolchainOpts};
use cmake_hold::commands::execute_with_dir;
use cmake_hold::config::{BuildConfiguration, Invocation};
use cmake_hold::error::BuildError;
use cmake_hold::reconfigure::Verdict;
use filetime::FileTime;
use predicates::prelude::*;

mod common;

use common::{RecordingToolchain, anchor, anchor_with, setup_project, write_database};

#[test]
fn test_full_developer_cycle() {
    let (temp_dir, layout) = setup_project();

    let first = RecordingToolchain::default();
    let report = anchor(
        &layout,
        BuildConfiguration {
            build_tests: true,
            ..Default::default()
        },
        &first,
    )
    .unwrap();
    assert_eq!(report.verdict, Verdict::NoState);
    assert_eq!(first.configure_count(), 1);
    assert_eq!(first.build_count(), 1);

    temp_dir
        .child("build/native/cmake-hold-args.json")
        .assert(predicate::str::contains("\"build_tests\": true"));
    temp_dir
        .child("compile_commands.json")
        .assert(predicate::str::contains("g++ -I/include -c core.cpp"));

    // Same options, restored from the cache: build only
    let second = RecordingToolchain::default();
    let report = anchor(&layout, BuildConfiguration::default(), &second).unwrap();
    assert_eq!(report.verdict, Verdict::UpToDate);
    assert!(report.config.build_tests);
    assert_eq!(second.configure_count(), 0);
    assert_eq!(second.build_count(), 1);
}

#[test]
fn test_changed_cache_value_reconfigures() {
    let (temp_dir, layout) = setup_project();
    anchor(
        &layout,
        BuildConfiguration::default(),
        &RecordingToolchain::default(),
    )
    .unwrap();

    // Someone edited the generator state by hand
    let state = temp_dir.child("build/native/CMakeCache.txt");
    let edited = fs::read_to_string(state.path())
        .unwrap()
        .replace("BUILD_TESTS:STRING=OFF", "BUILD_TESTS:STRING=ON");
    state.write_str(&edited).unwrap();

    let toolchain = RecordingToolchain::default();
    let report = anchor(&layout, BuildConfiguration::default(), &toolchain).unwrap();

    assert_eq!(
        report.verdict,
        Verdict::Changed {
            key: "BUILD_TESTS".to_string(),
            recorded: "ON".to_string(),
            requested: "OFF".to_string(),
        }
    );
    assert_eq!(toolchain.configure_count(), 1);
}

#[test]
fn test_unrecorded_key_does_not_reconfigure() {
    let (temp_dir, layout) = setup_project();
    temp_dir
        .child("build/native/CMakeCache.txt")
        .write_str("SOMETHING_ELSE:BOOL=ON\n")
        .unwrap();

    let toolchain = RecordingToolchain::default();
    let report = anchor(&layout, BuildConfiguration::default(), &toolchain).unwrap();

    assert_eq!(report.verdict, Verdict::UpToDate);
    assert_eq!(toolchain.configure_count(), 0);
}

#[test]
fn test_extra_args_take_part_in_decision() {
    let (_temp_dir, layout) = setup_project();
    anchor(
        &layout,
        BuildConfiguration {
            extra_args: "-DWITH_CUDA:BOOL=OFF -Wno-dev".to_string(),
            skip_cached_args: true,
            ..Default::default()
        },
        &RecordingToolchain::default(),
    )
    .unwrap();

    let toolchain = RecordingToolchain::default();
    let report = anchor(
        &layout,
        BuildConfiguration {
            extra_args: "-DWITH_CUDA:BOOL=ON -Wno-dev".to_string(),
            skip_cached_args: true,
            ..Default::default()
        },
        &toolchain,
    )
    .unwrap();

    assert!(matches!(report.verdict, Verdict::Changed { key, .. } if key == "WITH_CUDA"));
    let args = toolchain.last_configure().unwrap();
    assert!(args.contains(&"-DWITH_CUDA:BOOL=ON".to_string()));
    assert!(args.contains(&"-Wno-dev".to_string()));
}

#[test]
fn test_version_info_reaches_configure_env() {
    let (_temp_dir, layout) = setup_project();
    let opts = ToolchainOpts {
        version_info: Some("0.9.1".to_string()),
        ..common::toolchain_opts()
    };
    let toolchain = RecordingToolchain::default();

    anchor_with(
        &layout,
        BuildConfiguration::default(),
        &opts,
        Invocation::default(),
        &toolchain,
    )
    .unwrap();

    let envs = toolchain.envs.borrow();
    let cxxflags = envs[0].get("CXXFLAGS").unwrap();
    assert!(cxxflags.ends_with(r#"-DVERSION_INFO=\"0.9.1\""#));
}

#[test]
fn test_installer_build_leaves_no_traces() {
    let (temp_dir, layout) = setup_project();
    let toolchain = RecordingToolchain::default();

    let report = anchor_with(
        &layout,
        BuildConfiguration::default(),
        &common::toolchain_opts(),
        Invocation { installer: true },
        &toolchain,
    )
    .unwrap();

    assert!(!report.cache_mode.is_enabled());
    temp_dir
        .child("build/native/cmake-hold-args.json")
        .assert(predicate::path::missing());
    temp_dir
        .child("compile_commands.json")
        .assert(predicate::path::missing());
    temp_dir.child("build/utils").assert(predicate::path::missing());
}

#[cfg(unix)]
#[test]
fn test_output_links() {
    let (temp_dir, layout) = setup_project();

    anchor(
        &layout,
        BuildConfiguration::default(),
        &RecordingToolchain::default(),
    )
    .unwrap();

    let viewer = temp_dir.child("build/viewer");
    assert!(viewer.path().is_symlink());
    assert_eq!(
        fs::read_link(viewer.path()).unwrap(),
        layout.build_dir.join("utils/viewer/viewer")
    );
    assert!(temp_dir.child("build/utils").path().is_symlink());
}

#[cfg(unix)]
#[test]
fn test_headless_build_skips_viewer_link() {
    let (temp_dir, layout) = setup_project();

    let toolchain = RecordingToolchain::default();
    anchor(
        &layout,
        BuildConfiguration {
            headless: true,
            ..Default::default()
        },
        &toolchain,
    )
    .unwrap();

    assert!(
        toolchain
            .last_configure()
            .unwrap()
            .contains(&"-DBUILD_GUI_VIEWERS=OFF".to_string())
    );
    temp_dir.child("build/viewer").assert(predicate::path::missing());
    assert!(temp_dir.child("build/utils").path().is_symlink());
}

#[test]
fn test_merge_across_modules() {
    let (temp_dir, layout) = setup_project();
    write_database(
        &temp_dir.path().join("build/a_module"),
        &[("gcc -c a1.c", "a1.c"), ("clang -c a2.c", "a2.c")],
    );
    write_database(
        &temp_dir.path().join("build/b_module"),
        &[("gcc-12 -c b.c", "b.c")],
    );

    let cli = Cli::builder()
        .quiet(true)
        .command(Commands::Splice)
        .build()
        .unwrap();
    execute_with_dir(&cli, Some(temp_dir.path())).unwrap();

    let merged: Vec<serde_json::Value> =
        serde_json::from_str(&fs::read_to_string(layout.compile_commands_path()).unwrap())
            .unwrap();
    let commands: Vec<&str> = merged
        .iter()
        .map(|record| record["command"].as_str().unwrap())
        .collect();
    assert_eq!(commands, vec!["g++ -c a1.c", "clang -c a2.c", "gcc-12 -c b.c"]);
}

#[test]
fn test_splice_twice_keeps_database_untouched() {
    let (temp_dir, layout) = setup_project();
    write_database(
        &temp_dir.path().join("build/native"),
        &[("gcc -c x.cpp", "x.cpp")],
    );
    let cli = Cli::builder()
        .quiet(true)
        .command(Commands::Splice)
        .build()
        .unwrap();

    execute_with_dir(&cli, Some(temp_dir.path())).unwrap();
    let destination = layout.compile_commands_path();
    let old = FileTime::from_unix_time(1_000_000, 0);
    filetime::set_file_mtime(&destination, old).unwrap();

    execute_with_dir(&cli, Some(temp_dir.path())).unwrap();

    let metadata = fs::metadata(&destination).unwrap();
    assert_eq!(FileTime::from_last_modification_time(&metadata), old);
}

#[test]
fn test_invalid_module_database_is_fatal() {
    let (temp_dir, _layout) = setup_project();
    temp_dir
        .child("build/broken/compile_commands.json")
        .write_str("{\"not\": \"an array\"}")
        .unwrap();

    let cli = Cli::builder()
        .quiet(true)
        .command(Commands::Splice)
        .build()
        .unwrap();
    let result = execute_with_dir(&cli, Some(temp_dir.path()));

    assert!(matches!(
        result,
        Err(BuildError::InvalidCompileDatabase { path, .. }) if path.ends_with("broken/compile_commands.json")
    ));
}

#[test]
fn test_bilge_then_anchor_starts_fresh() {
    let (temp_dir, layout) = setup_project();
    anchor(
        &layout,
        BuildConfiguration {
            build_tests: true,
            ..Default::default()
        },
        &RecordingToolchain::default(),
    )
    .unwrap();

    let cli = Cli::builder()
        .quiet(true)
        .command(Commands::Bilge)
        .build()
        .unwrap();
    execute_with_dir(&cli, Some(temp_dir.path())).unwrap();
    temp_dir
        .child("build/native/cmake-hold-args.json")
        .assert(predicate::path::missing());

    let toolchain = RecordingToolchain::default();
    let report = anchor(&layout, BuildConfiguration::default(), &toolchain).unwrap();
    assert!(!report.config.build_tests);
    assert_eq!(toolchain.configure_count(), 1);
}

#[test]
fn test_custom_args_cache_path() {
    let (temp_dir, _layout) = setup_project();
    let cli = Cli::builder()
        .args_cache_path("cache/args.json")
        .quiet(true)
        .command(Commands::Bilge)
        .build()
        .unwrap();

    let custom = temp_dir.child("cache/args.json");
    arg_cache::save(custom.path(), &BuildConfiguration::default()).unwrap();
    custom.assert(predicate::path::exists());

    execute_with_dir(&cli, Some(temp_dir.path())).unwrap();
    custom.assert(predicate::path::missing());
}

#[test]
fn test_saved_cache_round_trips() {
    let (_temp_dir, layout) = setup_project();
    let config = BuildConfiguration {
        build_tests: true,
        extra_args: "-DA=1".to_string(),
        force_reconfigure: true,
        headless: true,
        skip_cached_args: false,
        skip_submodule_update: true,
    };
    arg_cache::save(&layout.args_cache_path, &config).unwrap();

    let persisted = arg_cache::load(&layout.args_cache_path, CacheMode::Enabled)
        .unwrap()
        .unwrap();
    let merged = arg_cache::merge(
        BuildConfiguration::default(),
        &persisted,
        &cmake_hold::config::default_blacklist(),
    );

    assert_eq!(merged, BuildConfiguration {
        force_reconfigure: false,
        ..config
    });
}
