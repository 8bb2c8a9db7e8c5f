//! Checks run before the repository is touched.
//!
//! Materialization deletes every tracked file from the working tree and
//! commits the staged content laid over what is left, so it refuses to start
//! when that would lose work or leak unrelated files into assignment branches.

use super::MaterializeOptions;
use crate::context::RepoContext;
use crate::error::{Result, WorkshopError};
use crate::git;
use std::path::Path;

/// Paths listed in an error before it is truncated.
const MAX_LISTED_PATHS: usize = 10;

/// Validate repository state and staged names.
///
/// Returns the staging directory as a `/`-separated path relative to the
/// repository root when it lies inside the working tree; that path is what
/// each branch build unstages.
pub(super) fn check(
    repo: &RepoContext,
    opts: &MaterializeOptions,
    staged: &[(String, &Path)],
) -> Result<Option<String>> {
    let root = &repo.repo_root;

    git::ensure_clean_worktree(root)?;

    if !git::branch_exists(root, &opts.main_branch)? {
        return Err(WorkshopError::UserError(format!(
            "main branch '{}' does not exist in {}",
            opts.main_branch,
            root.display()
        )));
    }

    let current = git::current_branch(root)?;
    for (name, dir) in staged {
        if *name == opts.main_branch {
            return Err(WorkshopError::UserError(format!(
                "staged directory '{}' has the same name as the main branch; rename it",
                name
            )));
        }
        if !git::is_valid_branch_name(root, name) {
            return Err(WorkshopError::UserError(format!(
                "'{}' is not a valid git branch name; rename the directory under {}",
                name,
                opts.staging_dir.display()
            )));
        }
        if current.as_deref() == Some(name.as_str()) {
            return Err(WorkshopError::UserError(format!(
                "branch '{}' is currently checked out; switch to '{}' first",
                name, opts.main_branch
            )));
        }
        if dir.join(".git").exists() {
            return Err(WorkshopError::UserError(format!(
                "staged directory '{}' contains a .git entry and cannot be copied into the repository",
                dir.display()
            )));
        }
    }

    let unstage_path = repo
        .relative_path(&opts.staging_dir)
        .map(|rel| {
            rel.components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .filter(|path| !path.is_empty());

    if let Some(path) = &unstage_path
        && !git::list_tracked_files(root, path)?.is_empty()
    {
        return Err(WorkshopError::UserError(format!(
            "staging directory '{}' is tracked by git.\n\
             It is rebuilt on every run; remove it from the index and add it to .gitignore:\n  \
             git rm -r --cached {}",
            path, path
        )));
    }

    if let Some(path) = &unstage_path {
        for (name, dir) in staged {
            if dir.join(path).symlink_metadata().is_ok() {
                return Err(WorkshopError::UserError(format!(
                    "staged directory '{}' contains '{}', which is the staging directory's own \
                     path in the repository; its content would be copied onto the staging directory.\n\
                     Rename that entry in the branch or move the staging directory.",
                    name, path
                )));
            }
        }
    }

    let staging_prefix = unstage_path.as_ref().map(|path| format!("{}/", path));
    let outside_staging = |file: &String| {
        staging_prefix
            .as_ref()
            .is_none_or(|prefix| !file.starts_with(prefix.as_str()))
    };

    let stray: Vec<String> = git::list_untracked_files(root)?
        .into_iter()
        .filter(outside_staging)
        .collect();
    if !stray.is_empty() {
        return Err(WorkshopError::UserError(format!(
            "repository has untracked files that would be committed to every branch:\n{}\n\n\
             Commit, remove, or ignore them before building branches.",
            listing(&stray)
        )));
    }

    // Ignored leftovers survive the removal of tracked files. Under a staged
    // entry they would be merged with, or overwritten by, branch content.
    let ignored: Vec<String> = git::list_ignored_paths(root)?
        .into_iter()
        .filter(outside_staging)
        .collect();
    if !ignored.is_empty() {
        for (name, dir) in staged {
            let entries = super::top_level_entries(dir)?;
            let clashes: Vec<String> = ignored
                .iter()
                .filter(|path| {
                    let top = path.split('/').next().unwrap_or(path.as_str());
                    entries.iter().any(|entry| entry == top)
                })
                .cloned()
                .collect();
            if !clashes.is_empty() {
                return Err(WorkshopError::UserError(format!(
                    "ignored files lie where branch '{}' writes its content:\n{}\n\n\
                     Remove them (for example with `git clean -X`) before building branches.",
                    name,
                    listing(&clashes)
                )));
            }
        }
    }

    Ok(unstage_path)
}

/// Indented list of paths, truncated after [`MAX_LISTED_PATHS`].
fn listing(paths: &[String]) -> String {
    let mut lines: Vec<String> = paths
        .iter()
        .take(MAX_LISTED_PATHS)
        .map(|path| format!("  {}", path))
        .collect();
    if paths.len() > MAX_LISTED_PATHS {
        lines.push(format!("  ... and {} more", paths.len() - MAX_LISTED_PATHS));
    }
    lines.join("\n")
}
