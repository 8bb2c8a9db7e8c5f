//! Git command runner for workshop-branches.
//!
//! Provides a wrapper around git commands with captured stdout/stderr
//! and structured error handling. All git operations go through this module,
//! and every nonzero exit status surfaces as a `GitError` carrying git's own
//! diagnostic output.

use crate::error::{Result, WorkshopError};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Result of a successful git command execution.
#[derive(Debug, Clone)]
pub struct GitOutput {
    /// Standard output from the command (trimmed).
    pub stdout: String,
    /// Standard error from the command (trimmed).
    pub stderr: String,
}

impl GitOutput {
    /// Create a new GitOutput from raw output bytes.
    fn from_output(output: &Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }

    /// Returns true if stdout is empty.
    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty()
    }
}

/// Run a git command with the specified working directory.
///
/// # Arguments
///
/// * `cwd` - The working directory to run the command in
/// * `args` - The git command arguments (without "git" prefix)
///
/// # Returns
///
/// * `Ok(GitOutput)` - On successful execution (exit code 0)
/// * `Err(WorkshopError::GitError)` - On spawn failure or non-zero exit code
pub fn run_git<P: AsRef<Path>>(cwd: P, args: &[&str]) -> Result<GitOutput> {
    let cwd = cwd.as_ref();

    let output = Command::new("git")
        .current_dir(cwd)
        .args(args)
        .output()
        .map_err(|e| {
            WorkshopError::GitError(format!(
                "failed to execute git {}: {}",
                args.first().unwrap_or(&""),
                e
            ))
        })?;

    let git_output = GitOutput::from_output(&output);

    if output.status.success() {
        Ok(git_output)
    } else {
        let exit_code = output.status.code().unwrap_or(-1);
        let error_msg = if git_output.stderr.is_empty() {
            git_output.stdout.clone()
        } else {
            git_output.stderr.clone()
        };

        Err(WorkshopError::GitError(format!(
            "git {} failed (exit code {}): {}",
            args.first().unwrap_or(&""),
            exit_code,
            error_msg
        )))
    }
}

/// Get the repository root directory using `git rev-parse --show-toplevel`.
///
/// # Returns
///
/// * `Ok(PathBuf)` - The absolute path to the repository root
/// * `Err(WorkshopError::UserError)` - If not inside a git repository
pub fn get_repo_root<P: AsRef<Path>>(cwd: P) -> Result<PathBuf> {
    let output = run_git_for_repo_detection(cwd.as_ref(), &["rev-parse", "--show-toplevel"])?;
    Ok(PathBuf::from(&output.stdout))
}

/// Get the absolute path of the repository's git directory (usually `.git/`).
pub fn get_git_dir<P: AsRef<Path>>(cwd: P) -> Result<PathBuf> {
    let output = run_git_for_repo_detection(cwd.as_ref(), &["rev-parse", "--absolute-git-dir"])?;
    Ok(PathBuf::from(&output.stdout))
}

/// Internal helper that returns a UserError instead of GitError for repo detection.
/// "Not in a git repo" is a clean user error (exit 1), not a git failure (exit 3).
fn run_git_for_repo_detection(cwd: &Path, args: &[&str]) -> Result<GitOutput> {
    let output = Command::new("git")
        .current_dir(cwd)
        .args(args)
        .output()
        .map_err(|e| {
            WorkshopError::UserError(format!("failed to execute git: {} (is git installed?)", e))
        })?;

    let git_output = GitOutput::from_output(&output);

    if output.status.success() {
        Ok(git_output)
    } else {
        let stderr = &git_output.stderr;
        if stderr.contains("not a git repository") || stderr.contains("fatal:") {
            Err(WorkshopError::UserError(format!(
                "'{}' is not inside a git repository.\n\
                 Branches can only be built inside the repository that hosts the workshop.",
                cwd.display()
            )))
        } else {
            Err(WorkshopError::UserError(format!(
                "git command failed: {}",
                if stderr.is_empty() {
                    &git_output.stdout
                } else {
                    stderr
                }
            )))
        }
    }
}

/// Get the currently checked-out branch, or `None` when HEAD is detached.
pub fn current_branch<P: AsRef<Path>>(cwd: P) -> Result<Option<String>> {
    let output = run_git(cwd, &["rev-parse", "--abbrev-ref", "HEAD"])?;
    let branch = output.stdout.trim();

    if branch == "HEAD" {
        Ok(None)
    } else {
        Ok(Some(branch.to_string()))
    }
}

/// Check whether a local branch exists.
pub fn branch_exists<P: AsRef<Path>>(cwd: P, branch: &str) -> Result<bool> {
    let result = run_git(
        cwd,
        &["rev-parse", "--verify", "--quiet", &format!("refs/heads/{}", branch)],
    );

    Ok(result.is_ok())
}

/// Check whether `name` is acceptable to git as a branch name.
pub fn is_valid_branch_name<P: AsRef<Path>>(cwd: P, name: &str) -> bool {
    !name.starts_with('-') && run_git(cwd, &["check-ref-format", "--branch", name]).is_ok()
}

/// List tracked files matching `pathspec`, relative to the repository root.
pub fn list_tracked_files<P: AsRef<Path>>(cwd: P, pathspec: &str) -> Result<Vec<String>> {
    let output = run_git(cwd, &["ls-files", "--cached", "--", pathspec])?;
    Ok(output.stdout.lines().map(str::to_string).collect())
}

/// List untracked files that are not ignored, relative to the repository root.
pub fn list_untracked_files<P: AsRef<Path>>(cwd: P) -> Result<Vec<String>> {
    let output = run_git(cwd, &["ls-files", "--others", "--exclude-standard"])?;
    Ok(output.stdout.lines().map(str::to_string).collect())
}

/// List untracked paths hidden by ignore rules, relative to the repository root.
///
/// A directory whose whole content is ignored is listed once, with a trailing `/`.
pub fn list_ignored_paths<P: AsRef<Path>>(cwd: P) -> Result<Vec<String>> {
    let output = run_git(
        cwd,
        &["ls-files", "--others", "--ignored", "--exclude-standard", "--directory"],
    )?;
    Ok(output.stdout.lines().map(str::to_string).collect())
}

/// Check if the working directory has uncommitted tracked changes.
///
/// Uses `git status --porcelain --untracked-files=no`, so untracked files
/// (such as the staging directory) do not count.
pub fn has_uncommitted_changes<P: AsRef<Path>>(cwd: P) -> Result<bool> {
    let output = run_git(cwd, &["status", "--porcelain", "--untracked-files=no"])?;
    Ok(!output.is_empty())
}

/// Verify that the repository has no uncommitted tracked changes.
///
/// Materialization removes every tracked file from the working tree, so any
/// uncommitted edit would be lost.
pub fn ensure_clean_worktree<P: AsRef<Path>>(repo_root: P) -> Result<()> {
    let repo_root = repo_root.as_ref();

    if has_uncommitted_changes(repo_root)? {
        Err(WorkshopError::UserError(format!(
            "repository has uncommitted changes.\n\
             Path: {}\n\n\
             Building branches rewrites the working tree. Commit or stash your changes first.\n\
             You can check the status with: git -C {} status",
            repo_root.display(),
            repo_root.display()
        )))
    } else {
        Ok(())
    }
}
