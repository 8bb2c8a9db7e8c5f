//! Implementation of the `materialize` and `build` commands.
//!
//! Both hold the repository build lock for their whole run. `build` assembles
//! first and only touches branches when assembly succeeded.

use super::assemble::{log_assembly, run_assemble};
use crate::cli::BranchArgs;
use crate::context::{RepoContext, WorkshopContext};
use crate::error::Result;
use crate::locks::{BuildAction, BuildLock, LockMetadata};
use crate::materialize::{MaterializeOptions, MaterializeReport, materialize, resolve_main_branch};

/// Execute the `materialize` command.
pub fn cmd_materialize(args: BranchArgs) -> Result<()> {
    let ctx = WorkshopContext::resolve(args.directory.as_deref())?;
    let repo = RepoContext::resolve_from(&ctx.source_dir)?;
    let main_branch = resolve_main_branch(&repo, args.main_branch.as_deref(), &ctx.config)?;

    let lock = acquire_lock(&ctx, &repo, BuildAction::Materialize, &main_branch)?;
    let result = run_materialize(&ctx, &repo, main_branch);
    release(lock);

    print_summary(&result?);
    Ok(())
}

/// Execute the `build` command.
pub fn cmd_build(args: BranchArgs) -> Result<()> {
    let ctx = WorkshopContext::resolve(args.directory.as_deref())?;
    let repo = RepoContext::resolve_from(&ctx.source_dir)?;
    let main_branch = resolve_main_branch(&repo, args.main_branch.as_deref(), &ctx.config)?;

    let lock = acquire_lock(&ctx, &repo, BuildAction::Build, &main_branch)?;
    let result = run_assemble(&ctx).and_then(|assembly| {
        log_assembly(&repo, &assembly);
        run_materialize(&ctx, &repo, main_branch)
    });
    release(lock);

    print_summary(&result?);
    Ok(())
}

fn run_materialize(
    ctx: &WorkshopContext,
    repo: &RepoContext,
    main_branch: String,
) -> Result<MaterializeReport> {
    let opts = MaterializeOptions {
        staging_dir: ctx.staging_dir.clone(),
        main_branch,
        commit_message: ctx.config.commit_message.clone(),
    };
    materialize(repo, &opts)
}

fn acquire_lock(
    ctx: &WorkshopContext,
    repo: &RepoContext,
    action: BuildAction,
    main_branch: &str,
) -> Result<BuildLock> {
    BuildLock::acquire(repo, &LockMetadata::new(action, &ctx.staging_dir, main_branch))
}

fn release(lock: BuildLock) {
    if let Err(e) = lock.release() {
        eprintln!("Warning: {}", e);
    }
}

fn print_summary(report: &MaterializeReport) {
    println!();
    println!("Created {} branches:", report.branches.len());
    for branch in &report.branches {
        let short = branch.commit.get(..7).unwrap_or(&branch.commit);
        println!("  {}  {}", short, branch.name);
    }
    println!();
    println!("Checked out '{}'.", report.main_branch);
}
