//! Build lock for workshop-branches.
//!
//! Materialization rewrites the single working tree and the checked-out
//! branch, so only one `build` or `materialize` may run against a repository
//! at a time. The lock is `.git/workshop-branches/build.lock`, created with
//! `create_new` and holding JSON that describes the running build: who
//! started it, which command, the staging directory it is reading and the
//! branch it returns to.
//!
//! A crashed build leaves the file behind; the "lock held" error names it so
//! it can be removed by hand.

#[cfg(test)]
mod tests;

use crate::context::RepoContext;
use crate::error::{Result, WorkshopError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Command holding the build lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildAction {
    Build,
    Materialize,
}

impl BuildAction {
    fn as_str(self) -> &'static str {
        match self {
            BuildAction::Build => "build",
            BuildAction::Materialize => "materialize",
        }
    }
}

/// Contents of the lock file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockMetadata {
    /// `user@HOST` of the holder.
    pub owner: String,
    pub pid: u32,
    pub created_at: DateTime<Utc>,
    pub action: BuildAction,
    /// Staging directory the build materializes from.
    pub staging_dir: PathBuf,
    /// Branch the build checks out between assignment branches.
    pub main_branch: String,
}

impl LockMetadata {
    /// Describe a build starting now in this process.
    pub fn new(action: BuildAction, staging_dir: &Path, main_branch: &str) -> Self {
        Self {
            owner: get_owner_string(),
            pid: std::process::id(),
            created_at: Utc::now(),
            action,
            staging_dir: staging_dir.to_path_buf(),
            main_branch: main_branch.to_string(),
        }
    }

    /// Read the metadata of a held lock. Unreadable or foreign content is `None`.
    fn read(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Age of the lock as `5m`, `2h 5m` or `2d 2h`.
    pub fn age_string(&self) -> String {
        let age = Utc::now().signed_duration_since(self.created_at);
        let minutes = age.num_minutes();
        let hours = age.num_hours();
        let days = age.num_days();

        if days > 0 {
            format!("{}d {}h", days, hours % 24)
        } else if hours > 0 {
            format!("{}h {}m", hours, minutes % 60)
        } else {
            format!("{}m", minutes)
        }
    }

    fn describe_holder(&self) -> String {
        format!(
            "A {} started by {} (pid {}) {} ago is rebuilding branches from {} \
             and returning to '{}'.",
            self.action.as_str(),
            self.owner,
            self.pid,
            self.age_string(),
            self.staging_dir.display(),
            self.main_branch
        )
    }
}

/// Held build lock. Dropping it removes the lock file.
#[derive(Debug)]
pub struct BuildLock {
    path: PathBuf,
    released: bool,
}

impl BuildLock {
    /// Take the repository build lock for the build described by `metadata`.
    ///
    /// # Returns
    ///
    /// * `Ok(BuildLock)` - Lock file created and metadata written
    /// * `Err(WorkshopError::LockError)` - Another build holds the lock (exit code 4)
    pub fn acquire(repo: &RepoContext, metadata: &LockMetadata) -> Result<Self> {
        let path = repo.build_lock_path();
        let state_dir = repo.state_dir();
        fs::create_dir_all(&state_dir).map_err(|e| {
            WorkshopError::LockError(format!(
                "failed to create lock directory '{}': {}",
                state_dir.display(),
                e
            ))
        })?;

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| held_or_failed(&path, e))?;

        // From here on the guard owns the file and removes it on any error.
        let lock = Self {
            path,
            released: false,
        };

        let json = serde_json::to_string_pretty(metadata).map_err(|e| {
            WorkshopError::LockError(format!("failed to serialize lock metadata: {}", e))
        })?;
        file.write_all(json.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| {
                WorkshopError::LockError(format!(
                    "failed to write lock file '{}': {}",
                    lock.path.display(),
                    e
                ))
            })?;

        Ok(lock)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock before the guard goes out of scope, surfacing errors.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        fs::remove_file(&self.path).map_err(|e| {
            WorkshopError::LockError(format!(
                "failed to release lock '{}': {}",
                self.path.display(),
                e
            ))
        })
    }
}

impl Drop for BuildLock {
    fn drop(&mut self) {
        if !self.released
            && let Err(e) = fs::remove_file(&self.path)
        {
            eprintln!(
                "Warning: failed to release lock '{}': {}",
                self.path.display(),
                e
            );
        }
    }
}

fn held_or_failed(path: &Path, err: std::io::Error) -> WorkshopError {
    if err.kind() != ErrorKind::AlreadyExists {
        return WorkshopError::LockError(format!(
            "failed to create lock file '{}': {}",
            path.display(),
            err
        ));
    }

    let holder = LockMetadata::read(path)
        .map(|meta| format!("\n{}", meta.describe_holder()))
        .unwrap_or_default();
    WorkshopError::LockError(format!(
        "another build is running against this repository.{}\n\
         If that process is gone, remove the lock file: {}",
        holder,
        path.display()
    ))
}

/// `user@HOST` for the current process, shared by locks and events.
pub(crate) fn get_owner_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}
