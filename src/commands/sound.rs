//! Sound command: report whether the next build would reconfigure.

use crate::cli::ToolchainOpts;
use crate::commands::anchor::{log_plan, restore_configuration};
use crate::config::{BuildConfiguration, Invocation};
use crate::error::Result;
use crate::layout::Layout;
use crate::logging::Logger;
use crate::plan::{BuildPlan, Host};
use crate::reconfigure::{self, Verdict};

/// Runs the argument restore and reconfigure decision of `anchor` without
/// running any tool or writing any file.
pub fn sound(
    layout: &Layout,
    config: BuildConfiguration,
    toolchain_opts: &ToolchainOpts,
    host: &Host,
    invocation: &Invocation,
    verbose: u8,
    quiet: bool,
) -> Result<Verdict> {
    let log = Logger::new(verbose, quiet);
    let (config, _) = restore_configuration(layout, config, invocation, &log)?;
    let plan = BuildPlan::assemble(&config, toolchain_opts, layout, host, invocation)?;
    log_plan(&plan, &log);

    let verdict = reconfigure::should_reconfigure(
        &plan.generator_args,
        &layout.state_file(),
        config.force_reconfigure,
    )?;

    if verdict.requires_reconfigure() {
        log.info(format!("Next build reconfigures: {}", verdict.describe()));
    } else {
        log.info("Next build is incremental: configuration unchanged");
    }

    Ok(verdict)
}
