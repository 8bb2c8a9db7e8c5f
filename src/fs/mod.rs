//! Filesystem utilities for workshop-branches.
//!
//! This module provides the tree copier used to assemble staging directories
//! and to lay staged content onto a repository working tree, plus directory
//! enumeration helpers.

mod copy;
mod dirs;

pub use copy::{copy_file, copy_tree};
pub use dirs::{dir_name, list_subdirectories, recreate_dir};

use crate::error::WorkshopError;
use std::path::Path;

/// Build an `IoError` naming the path and the failed action.
pub(crate) fn io_error(action: &str, path: &Path, err: std::io::Error) -> WorkshopError {
    WorkshopError::IoError(format!("failed to {} '{}': {}", action, path.display(), err))
}
