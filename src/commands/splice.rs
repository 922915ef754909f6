//! Splice command: merge the compile command databases on their own.

use crate::compile_commands::{self, MergeSummary};
use crate::error::Result;
use crate::layout::Layout;
use crate::logging::Logger;

/// Merges every module's `compile_commands.json` below the build directory's
/// parent into the project root.
pub fn splice(layout: &Layout, verbose: u8, quiet: bool) -> Result<MergeSummary> {
    let log = Logger::new(verbose, quiet);
    let destination = layout.compile_commands_path();

    log.verbose(
        1,
        format!(
            "Splicing compile commands under {}",
            layout.build_parent().display()
        ),
    );

    let summary = compile_commands::merge_into(layout.build_parent(), &destination)?;

    for dir in &summary.unreadable {
        log.warn(format!("Skipped unreadable directory {}", dir.display()));
    }
    for source in &summary.sources {
        log.verbose(2, format!("  {}", source.display()));
    }

    log.info(format!(
        "Spliced {} compile command(s) from {} database(s)",
        summary.records,
        summary.sources.len()
    ));
    log.detail("Database", destination.display());
    log.detail(
        "Status",
        if summary.written {
            "updated"
        } else {
            "unchanged"
        },
    );

    Ok(summary)
}
