//! Directory enumeration and staging directory helpers.

use super::io_error;
use crate::error::{Result, WorkshopError};
use std::fs;
use std::path::{Path, PathBuf};

/// List the immediate subdirectories of `path`, sorted by name.
///
/// Plain files and symlinks are excluded. A missing or unreadable `path`
/// yields an empty list; callers that care whether the folder exists must
/// check that themselves.
pub fn list_subdirectories<P: AsRef<Path>>(path: P) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(path.as_ref()) else {
        return Vec::new();
    };

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .map(|entry| entry.path())
        .collect();
    dirs.sort();
    dirs
}

/// Delete `path` recursively if it exists, then create it empty.
pub fn recreate_dir<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    if path.exists() {
        fs::remove_dir_all(path).map_err(|e| io_error("remove directory", path, e))?;
    }
    fs::create_dir_all(path).map_err(|e| io_error("create directory", path, e))
}

/// The final component of `path` as UTF-8, used as a branch identifier.
pub fn dir_name(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            WorkshopError::UserError(format!(
                "directory name '{}' is not valid UTF-8 and cannot be used as a branch name",
                path.display()
            ))
        })
}
