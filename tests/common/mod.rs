#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use assert_fs::TempDir;
use cmake_hold::cli::ToolchainOpts;
use cmake_hold::commands::{Anchor, AnchorReport};
use cmake_hold::config::{BuildConfiguration, Invocation};
use cmake_hold::error::Result;
use cmake_hold::layout::Layout;
use cmake_hold::toolchain::Toolchain;

/// Stands in for CMake: records every step and writes the files CMake and
/// the build would leave behind.
#[derive(Default)]
pub struct RecordingToolchain {
    pub configures: RefCell<Vec<Vec<String>>>,
    pub builds: RefCell<Vec<Vec<String>>>,
    pub envs: RefCell<Vec<BTreeMap<String, String>>>,
}

impl RecordingToolchain {
    pub fn configure_count(&self) -> usize {
        self.configures.borrow().len()
    }

    pub fn build_count(&self) -> usize {
        self.builds.borrow().len()
    }

    pub fn last_configure(&self) -> Option<Vec<String>> {
        self.configures.borrow().last().cloned()
    }
}

impl Toolchain for RecordingToolchain {
    fn configure(
        &self,
        _source_dir: &Path,
        build_dir: &Path,
        args: &[String],
        env: &BTreeMap<String, String>,
    ) -> Result<()> {
        self.configures.borrow_mut().push(args.to_vec());
        self.envs.borrow_mut().push(env.clone());

        fs::create_dir_all(build_dir).unwrap();
        let mut cache = String::from("# This is the CMakeCache file.\n// comment\n");
        for definition in args.iter().filter_map(|arg| arg.strip_prefix("-D")) {
            let (key, value) = definition.split_once('=').unwrap();
            let key = key.split(':').next().unwrap();
            cache.push_str(&format!("{key}:STRING={value}\n"));
        }
        cache.push_str("CMAKE_GENERATOR:INTERNAL=Unix Makefiles\n");
        fs::write(build_dir.join("CMakeCache.txt"), cache).unwrap();

        if args.iter().any(|arg| arg == "-DCMAKE_EXPORT_COMPILE_COMMANDS=ON") {
            write_database(
                build_dir,
                &[("gcc -I/include -c core.cpp", "core.cpp")],
            );
        }
        Ok(())
    }

    fn build(&self, build_dir: &Path, args: &[String]) -> Result<()> {
        self.builds.borrow_mut().push(args.to_vec());
        let viewer_dir = build_dir.join("utils/viewer");
        fs::create_dir_all(&viewer_dir).unwrap();
        fs::write(viewer_dir.join("viewer"), "").unwrap();
        Ok(())
    }
}

/// Writes a `compile_commands.json` into `dir` with one record per entry.
pub fn write_database(dir: &Path, entries: &[(&str, &str)]) {
    let records: Vec<serde_json::Value> = entries
        .iter()
        .map(|(command, file)| {
            serde_json::json!({
                "directory": dir.display().to_string(),
                "command": command,
                "file": file,
            })
        })
        .collect();
    fs::create_dir_all(dir).unwrap();
    fs::write(
        dir.join("compile_commands.json"),
        serde_json::to_string(&records).unwrap(),
    )
    .unwrap();
}

/// A project with a source directory and nothing built yet.
pub fn setup_project() -> (TempDir, Layout) {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("src")).unwrap();
    fs::write(
        temp_dir.path().join("src/CMakeLists.txt"),
        "cmake_minimum_required(VERSION 3.16)\nproject(demo CXX)\n",
    )
    .unwrap();
    let layout = Layout::new(temp_dir.path(), "build/native");
    (temp_dir, layout)
}

pub fn toolchain_opts() -> ToolchainOpts {
    ToolchainOpts {
        source_dir: PathBuf::from("src"),
        ..Default::default()
    }
}

/// Runs `anchor` quietly without touching git.
pub fn anchor(
    layout: &Layout,
    config: BuildConfiguration,
    toolchain: &RecordingToolchain,
) -> Result<AnchorReport> {
    anchor_with(layout, config, &toolchain_opts(), Invocation::default(), toolchain)
}

pub fn anchor_with(
    layout: &Layout,
    config: BuildConfiguration,
    opts: &ToolchainOpts,
    invocation: Invocation,
    toolchain: &RecordingToolchain,
) -> Result<AnchorReport> {
    Anchor::builder()
        .layout(layout)
        .config(BuildConfiguration {
            skip_submodule_update: true,
            ..config
        })
        .toolchain_opts(opts)
        .invocation(invocation)
        .quiet(true)
        .build()?
        .run(toolchain)
}
