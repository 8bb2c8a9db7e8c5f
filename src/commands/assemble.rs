//! Implementation of the `assemble` command.

use crate::assemble::{AssemblyReport, assemble};
use crate::cli::WorkshopArgs;
use crate::context::{RepoContext, WorkshopContext};
use crate::error::Result;
use crate::events::{Event, EventAction, record_event};
use serde_json::json;

/// Execute the `assemble` command.
pub fn cmd_assemble(args: WorkshopArgs) -> Result<()> {
    let ctx = WorkshopContext::resolve(args.directory.as_deref())?;
    let report = run_assemble(&ctx)?;

    // Assembly also works outside a repository; the event log needs one.
    if let Ok(repo) = RepoContext::resolve_from(&ctx.source_dir) {
        log_assembly(&repo, &report);
    }

    Ok(())
}

/// Assemble the staging directory and print a summary line.
pub(super) fn run_assemble(ctx: &WorkshopContext) -> Result<AssemblyReport> {
    let report = assemble(ctx)?;
    println!(
        "Assembled {} branches in {}",
        report.branch_count(),
        report.staging_dir.display()
    );
    Ok(report)
}

pub(super) fn log_assembly(repo: &RepoContext, report: &AssemblyReport) {
    record_event(
        repo,
        &Event::new(EventAction::Assemble).with_details(json!({
            "staging_dir": report.staging_dir.display().to_string(),
            "branches": report.branches,
        })),
    );
}
