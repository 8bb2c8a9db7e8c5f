//! Conversion of staged directories into orphan branches.
//!
//! Every subdirectory of the staging directory becomes a branch of the same
//! name whose only commit holds exactly that subdirectory's files.
//!
//! # Per-branch steps
//!
//! 1. Force-delete an existing local branch with the same name
//! 2. `git checkout --orphan <name>`
//! 3. Remove every tracked file from the working tree
//! 4. Copy the staged content onto the working tree root
//! 5. Stage the copied top-level entries, and nothing else
//! 6. Unstage the staging directory if a staged entry pulled it in
//! 7. Commit
//! 8. Switch back to the main branch
//!
//! All branches share the one working tree and the checked-out branch, so
//! they are processed strictly one after another. When a step fails the main
//! branch is force-checked-out again and the failing branch is reported.
//! Branches completed before the failure are kept.
//!
//! Removing the tracked files also removes the main branch's `.gitignore`,
//! while ignored files stay on disk. Staging only the copied entries keeps
//! those leftovers out of every commit; preflight refuses to start when one
//! of them lives under a staged entry.

mod preflight;


use crate::config::Config;
use crate::context::RepoContext;
use crate::error::{Result, WorkshopError};
use crate::events::{Event, EventAction, record_event};
use crate::fs::{copy_tree, dir_name, io_error, list_subdirectories};
use crate::git::{self, run_git};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

/// Inputs of a materialization run.
#[derive(Debug, Clone)]
pub struct MaterializeOptions {
    /// Directory holding one subdirectory per branch.
    pub staging_dir: PathBuf,
    /// Branch checked out between and after branch builds.
    pub main_branch: String,
    /// Message of each branch's single commit.
    pub commit_message: String,
}

/// A branch written by [`materialize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedBranch {
    pub name: String,
    pub commit: String,
}

/// Outcome of a successful materialization.
#[derive(Debug, Clone)]
pub struct MaterializeReport {
    pub main_branch: String,
    pub branches: Vec<MaterializedBranch>,
}

/// Pick the main branch: explicit flag, then `main_branch` from config, then
/// whatever is checked out right now.
pub fn resolve_main_branch(
    repo: &RepoContext,
    flag: Option<&str>,
    config: &Config,
) -> Result<String> {
    if let Some(branch) = flag.or(config.main_branch.as_deref()) {
        return Ok(branch.to_string());
    }

    git::current_branch(&repo.repo_root)?.ok_or_else(|| {
        WorkshopError::UserError(
            "HEAD is detached and no main branch is configured.\n\
             Check out your main branch, pass --main-branch, or set main_branch in workshop.yaml."
                .to_string(),
        )
    })
}

/// Turn every staged subdirectory into an orphan branch of `repo`.
///
/// # Returns
///
/// * `Ok(MaterializeReport)` - Every branch was committed; HEAD is back on main
/// * `Err(WorkshopError::UserError)` - Nothing staged, or a precondition failed
/// * `Err(WorkshopError::BranchFailed)` - A step failed for the named branch
pub fn materialize(repo: &RepoContext, opts: &MaterializeOptions) -> Result<MaterializeReport> {
    let staged_dirs = list_subdirectories(&opts.staging_dir);
    if staged_dirs.is_empty() {
        return Err(WorkshopError::UserError(format!(
            "no branches found in {}",
            opts.staging_dir.display()
        )));
    }

    let mut staged: Vec<(String, &Path)> = Vec::with_capacity(staged_dirs.len());
    for dir in &staged_dirs {
        staged.push((dir_name(dir)?.to_string(), dir.as_path()));
    }

    let unstage_path = preflight::check(repo, opts, &staged)?;

    let mut branches = Vec::with_capacity(staged.len());
    for (name, dir) in &staged {
        println!("Building branch '{}'", name);

        match build_branch(repo, opts, name, dir, unstage_path.as_deref()) {
            Ok(commit) => {
                record_event(
                    repo,
                    &Event::new(EventAction::BranchCreated)
                        .with_branch(name.as_str())
                        .with_details(json!({ "commit": commit })),
                );
                branches.push(MaterializedBranch {
                    name: name.clone(),
                    commit,
                });
            }
            Err(err) => {
                let mut message = err.to_string();
                if let Err(restore_err) =
                    run_git(&repo.repo_root, &["checkout", "--quiet", "-f", &opts.main_branch])
                {
                    message.push_str(&format!(
                        "\nAlso failed to restore branch '{}': {}",
                        opts.main_branch, restore_err
                    ));
                }

                record_event(
                    repo,
                    &Event::new(EventAction::BranchFailed)
                        .with_branch(name.as_str())
                        .with_details(json!({ "error": message })),
                );
                return Err(WorkshopError::BranchFailed {
                    branch: name.clone(),
                    message,
                });
            }
        }
    }

    record_event(
        repo,
        &Event::new(EventAction::Materialize).with_details(json!({
            "main_branch": opts.main_branch,
            "branches": branches.iter().map(|b| b.name.as_str()).collect::<Vec<_>>(),
        })),
    );

    Ok(MaterializeReport {
        main_branch: opts.main_branch.clone(),
        branches,
    })
}

/// Run the eight per-branch steps and return the new commit id.
fn build_branch(
    repo: &RepoContext,
    opts: &MaterializeOptions,
    name: &str,
    staged_dir: &Path,
    unstage_path: Option<&str>,
) -> Result<String> {
    let root = &repo.repo_root;

    if git::branch_exists(root, name)? {
        run_git(root, &["branch", "-D", name])?;
    }
    run_git(root, &["checkout", "--quiet", "--orphan", name])?;
    run_git(root, &["rm", "-r", "-f", "--quiet", "--ignore-unmatch", "."])?;

    copy_tree(staged_dir, root)?;

    let entries = top_level_entries(staged_dir)?;
    if !entries.is_empty() {
        let pathspecs: Vec<String> = entries
            .iter()
            .map(|entry| format!(":(literal){}", entry))
            .collect();
        let mut args = vec!["add", "--all", "--force", "--"];
        args.extend(pathspecs.iter().map(String::as_str));
        run_git(root, &args)?;
    }
    if let Some(path) = unstage_path
        && !git::list_tracked_files(root, path)?.is_empty()
    {
        run_git(root, &["reset", "--quiet", "--", path])?;
    }

    run_git(
        root,
        &["commit", "--quiet", "--allow-empty", "-m", &opts.commit_message],
    )?;
    let commit = run_git(root, &["rev-parse", "HEAD"])?.stdout;

    run_git(root, &["checkout", "--quiet", &opts.main_branch])?;

    Ok(commit)
}

/// Names of the regular files and directories directly inside `dir`, sorted.
///
/// These are exactly the entries [`copy_tree`] writes at the top level.
fn top_level_entries(dir: &Path) -> Result<Vec<String>> {
    let read_dir = fs::read_dir(dir).map_err(|e| io_error("read directory", dir, e))?;

    let mut entries = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| io_error("read directory entry in", dir, e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| io_error("stat", &entry.path(), e))?;
        if file_type.is_dir() || file_type.is_file() {
            entries.push(dir_name(&entry.path())?.to_string());
        }
    }
    entries.sort();
    Ok(entries)
}
