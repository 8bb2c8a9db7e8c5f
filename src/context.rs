//! Workshop and repository context resolution.
//!
//! `WorkshopContext` resolves the workshop source layout (branches, shared and
//! staging directories) from a workshop root and its optional `workshop.yaml`.
//! `RepoContext` is the explicit handle to the Git repository whose branches
//! are rewritten; nothing downstream relies on the process working directory.

use crate::config::{CONFIG_FILE_NAME, Config};
use crate::error::{Result, WorkshopError};
use crate::git;
use std::env;
use std::path::{Path, PathBuf};

/// Directory inside the git dir that holds the build lock and event log.
pub const STATE_DIR_NAME: &str = "workshop-branches";

/// Resolved paths for a workshop source tree. All paths are absolute.
#[derive(Debug, Clone)]
pub struct WorkshopContext {
    /// Workshop root directory.
    pub source_dir: PathBuf,

    /// `{source_dir}/branches`, one subdirectory per branch identifier.
    pub branches_dir: PathBuf,

    /// `{source_dir}/shared`, optional content common to every branch.
    pub shared_dir: PathBuf,

    /// `{source_dir}/target`, rebuilt on every assembly.
    pub staging_dir: PathBuf,

    /// Loaded configuration (defaults when `workshop.yaml` is absent).
    pub config: Config,
}

impl WorkshopContext {
    /// Resolve the workshop rooted at `dir`, or at the current directory
    /// when `dir` is `None`.
    pub fn resolve(dir: Option<&Path>) -> Result<Self> {
        match dir {
            Some(dir) => Self::resolve_from(dir),
            None => {
                let cwd = env::current_dir().map_err(|e| {
                    WorkshopError::UserError(format!(
                        "failed to get current working directory: {}",
                        e
                    ))
                })?;
                Self::resolve_from(cwd)
            }
        }
    }

    /// Resolve the workshop rooted at `dir`, loading `workshop.yaml` if present.
    pub fn resolve_from<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();

        let source_dir = dir.canonicalize().map_err(|e| {
            WorkshopError::UserError(format!(
                "workshop directory '{}' is not accessible: {}",
                dir.display(),
                e
            ))
        })?;

        if !source_dir.is_dir() {
            return Err(WorkshopError::UserError(format!(
                "workshop path '{}' is not a directory",
                source_dir.display()
            )));
        }

        let config = Config::load_or_default(source_dir.join(CONFIG_FILE_NAME))?;
        Ok(Self::with_config(source_dir, config))
    }

    /// Build a context from an already-resolved root and config.
    pub fn with_config(source_dir: PathBuf, config: Config) -> Self {
        Self {
            branches_dir: source_dir.join(&config.branches_dir),
            shared_dir: source_dir.join(&config.shared_dir),
            staging_dir: source_dir.join(&config.staging_dir),
            source_dir,
            config,
        }
    }

    /// Path to `workshop.yaml`.
    pub fn config_path(&self) -> PathBuf {
        self.source_dir.join(CONFIG_FILE_NAME)
    }

    /// Staged directory of a single branch.
    pub fn staged_branch(&self, branch: &str) -> PathBuf {
        self.staging_dir.join(branch)
    }
}

/// Handle to the repository whose branches are materialized.
#[derive(Debug, Clone)]
pub struct RepoContext {
    /// Absolute, canonical path to the working tree root.
    pub repo_root: PathBuf,

    /// Absolute path to the git directory (usually `{repo_root}/.git`).
    pub git_dir: PathBuf,
}

impl RepoContext {
    /// Resolve the repository containing `dir`.
    ///
    /// # Returns
    ///
    /// * `Ok(RepoContext)` - Successfully resolved
    /// * `Err(WorkshopError::UserError)` - If `dir` is not inside a git repository
    pub fn resolve_from<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();

        let repo_root = git::get_repo_root(dir)?;
        let repo_root = repo_root.canonicalize().unwrap_or(repo_root);
        let git_dir = git::get_git_dir(dir)?;

        Ok(Self { repo_root, git_dir })
    }

    /// Directory for machine-local build state; never part of any branch.
    pub fn state_dir(&self) -> PathBuf {
        self.git_dir.join(STATE_DIR_NAME)
    }

    /// Path to the build lock file.
    pub fn build_lock_path(&self) -> PathBuf {
        self.state_dir().join("build.lock")
    }

    /// Path to the NDJSON event log.
    pub fn events_file(&self) -> PathBuf {
        self.state_dir().join("events.ndjson")
    }

    /// `path` relative to the working tree root, if it lies inside it.
    pub fn relative_path(&self, path: &Path) -> Option<PathBuf> {
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        path.strip_prefix(&self.repo_root)
            .ok()
            .map(Path::to_path_buf)
    }
}
