//! Anchor command: the full incremental native build.

use crate::arg_cache::{self, CacheMode};
use crate::cli::ToolchainOpts;
use crate::compile_commands::{self, MergeSummary};
use crate::config::{BuildConfiguration, Invocation, default_blacklist};
use crate::error::{BuildError, Result};
use crate::layout::Layout;
use crate::links::{self, DEFAULT_LINKS, LinkOutcome};
use crate::lock::BuildDirLock;
use crate::logging::Logger;
use crate::plan::{BuildPlan, Host};
use crate::reconfigure::{self, Verdict};
use crate::submodules;
use crate::toolchain::Toolchain;

/// What an anchor run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorReport {
    /// The effective configuration after restoring cached arguments.
    pub config: BuildConfiguration,
    pub cache_mode: CacheMode,
    pub verdict: Verdict,
    /// Submodules updated, or `None` if synchronization was skipped.
    pub submodules_updated: Option<usize>,
    pub links: Vec<LinkOutcome>,
    /// `None` for installer builds.
    pub merge: Option<MergeSummary>,
    /// The argument cache was written.
    pub saved: bool,
}

pub struct Anchor<'a> {
    pub(crate) layout: &'a Layout,
    pub(crate) config: BuildConfiguration,
    pub(crate) toolchain_opts: &'a ToolchainOpts,
    pub(crate) host: Host,
    pub(crate) invocation: Invocation,
    pub(crate) verbose: u8,
    pub(crate) quiet: bool,
}

pub struct AnchorBuilder<'a> {
    layout: Option<&'a Layout>,
    config: BuildConfiguration,
    toolchain_opts: Option<&'a ToolchainOpts>,
    host: Host,
    invocation: Invocation,
    verbose: u8,
    quiet: bool,
}

impl Default for AnchorBuilder<'_> {
    fn default() -> Self {
        Self {
            layout: None,
            config: BuildConfiguration::default(),
            toolchain_opts: None,
            host: Host::default(),
            invocation: Invocation::default(),
            verbose: 0,
            quiet: false,
        }
    }
}

impl<'a> Anchor<'a> {
    pub fn builder() -> AnchorBuilder<'a> {
        AnchorBuilder::new()
    }

    /// Runs the build through `toolchain`.
    ///
    /// Holds the build directory lock for the whole run. Every failure is
    /// fatal and nothing is retried.
    pub fn run(self, toolchain: &dyn Toolchain) -> Result<AnchorReport> {
        let Anchor {
            layout,
            config,
            toolchain_opts,
            host,
            invocation,
            verbose,
            quiet,
        } = self;
        let log = Logger::new(verbose, quiet);
        log.info("⚓ Anchoring native build...");

        let lock = BuildDirLock::acquire(&layout.lock_path())?;
        log.verbose(2, format!("Locked {}", lock.path().display()));

        let (config, cache_mode) = restore_configuration(layout, config, &invocation, &log)?;

        let submodules_updated = sync_submodules(layout, &config, &log)?;

        let plan = BuildPlan::assemble(&config, toolchain_opts, layout, &host, &invocation)?;
        log_plan(&plan, &log);

        let verdict = reconfigure::should_reconfigure(
            &plan.generator_args,
            &layout.state_file(),
            config.force_reconfigure,
        )?;

        if verdict.requires_reconfigure() {
            log.info(format!("Configuring ({})", verdict.describe()));
            toolchain.configure(
                plan.source_dir(),
                &plan.build_dir,
                &plan.generator_args,
                &plan.env,
            )?;
        } else {
            log.verbose(1, format!("Skipping configure: {}", verdict.describe()));
        }

        log.info(format!("Building ({})", plan.build_type));
        toolchain.build(&plan.build_dir, &plan.build_args)?;

        let mut report = AnchorReport {
            config,
            cache_mode,
            verdict,
            submodules_updated,
            links: Vec::new(),
            merge: None,
            saved: false,
        };

        if invocation.installer {
            log.verbose(1, "Installer build: skipping links and compile commands");
        } else {
            report.links = links::create_links(
                DEFAULT_LINKS,
                &layout.build_dir,
                layout.build_parent(),
                report.config.headless,
            )?;
            log_links(&report.links, &log);

            let summary = compile_commands::merge_into(
                layout.build_parent(),
                &layout.compile_commands_path(),
            )?;
            log.verbose(
                1,
                format!(
                    "Merged {} compile commands from {} database(s)",
                    summary.records,
                    summary.sources.len()
                ),
            );
            for dir in &summary.unreadable {
                log.warn(format!("Skipped unreadable directory {}", dir.display()));
            }
            report.merge = Some(summary);
        }

        if report.cache_mode.is_enabled() {
            arg_cache::save(&layout.args_cache_path, &report.config)?;
            report.saved = true;
            log.verbose(
                1,
                format!(
                    "Saved build arguments to {}",
                    layout.args_cache_path.display()
                ),
            );
        }

        log.info("⚓ Native build anchored successfully");
        if !log.quiet() {
            log.detail("Reconfigured", report.verdict.requires_reconfigure());
            if let Some(summary) = &report.merge {
                log.detail(
                    "compile_commands.json",
                    if summary.written {
                        "updated"
                    } else {
                        "unchanged"
                    },
                );
            }
        }

        Ok(report)
    }
}

fn sync_submodules(
    layout: &Layout,
    config: &BuildConfiguration,
    log: &Logger,
) -> Result<Option<usize>> {
    if config.skip_submodule_update {
        log.verbose(1, "Skipping submodule update");
        return Ok(None);
    }

    let Some(repo) = submodules::discover_repo(&layout.project_root) else {
        log.verbose(1, "Not a git work tree, skipping submodule update");
        return Ok(None);
    };

    let updated = submodules::update_submodules(&repo)?;
    log.verbose(1, format!("Updated {updated} submodule(s)"));
    Ok(Some(updated))
}

/// Decides the cache mode and overlays the cached arguments on `config`.
pub(crate) fn restore_configuration(
    layout: &Layout,
    config: BuildConfiguration,
    invocation: &Invocation,
    log: &Logger,
) -> Result<(BuildConfiguration, CacheMode)> {
    let mode = CacheMode::for_invocation(&config, invocation);

    let config = match arg_cache::load(&layout.args_cache_path, mode)? {
        Some(persisted) => {
            log.verbose(
                1,
                format!(
                    "Restored build arguments from {}",
                    layout.args_cache_path.display()
                ),
            );
            arg_cache::merge(config, &persisted, &default_blacklist())
        }
        None => {
            if let CacheMode::Disabled(reason) = mode {
                log.verbose(1, format!("Argument cache {reason}"));
            }
            config
        }
    };

    Ok((config, mode))
}

pub(crate) fn log_plan(plan: &BuildPlan, log: &Logger) {
    if log.level() < 2 {
        return;
    }
    log.info("Generator arguments:");
    for arg in &plan.generator_args {
        log.info(format!("  {arg}"));
    }
    for (name, value) in &plan.env {
        log.detail(name, value);
    }
}

fn log_links(outcomes: &[LinkOutcome], log: &Logger) {
    for outcome in outcomes {
        match outcome {
            LinkOutcome::Created(path) => log.verbose(1, format!("Linked {}", path.display())),
            LinkOutcome::MissingTarget(target) => log.verbose(
                1,
                format!("Not linking {}: not built", target.display()),
            ),
            LinkOutcome::Unsupported => {
                log.warn("Symlinks are not supported on this platform, skipping output links");
                break;
            }
            LinkOutcome::AlreadyLinked(_) | LinkOutcome::Headless => {}
        }
    }
}

impl<'a> AnchorBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layout(mut self, layout: &'a Layout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Options from the command line, with environment overrides applied.
    pub fn config(mut self, config: BuildConfiguration) -> Self {
        self.config = config;
        self
    }

    pub fn toolchain_opts(mut self, opts: &'a ToolchainOpts) -> Self {
        self.toolchain_opts = Some(opts);
        self
    }

    pub fn host(mut self, host: Host) -> Self {
        self.host = host;
        self
    }

    pub fn invocation(mut self, invocation: Invocation) -> Self {
        self.invocation = invocation;
        self
    }

    pub fn verbose(mut self, verbose: u8) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn build(self) -> Result<Anchor<'a>> {
        Ok(Anchor {
            layout: self
                .layout
                .ok_or_else(|| BuildError::ConfigError("layout is required".to_string()))?,
            config: self.config,
            toolchain_opts: self
                .toolchain_opts
                .ok_or_else(|| BuildError::ConfigError("toolchain_opts is required".to_string()))?,
            host: self.host,
            invocation: self.invocation,
            verbose: self.verbose,
            quiet: self.quiet,
        })
    }
}
