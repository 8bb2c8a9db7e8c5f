//! Error types for the workshop-branches CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for workshop operations.
///
/// Each variant maps to a specific process exit code.
#[derive(Error, Debug)]
pub enum WorkshopError {
    /// User provided invalid input or the repository is in an unusable state.
    #[error("{0}")]
    UserError(String),

    /// A filesystem operation (copy, create, remove) failed.
    #[error("I/O failure: {0}")]
    IoError(String),

    /// Git operation failed.
    #[error("Git operation failed: {0}")]
    GitError(String),

    /// Materializing a single branch failed part way through.
    #[error("failed to materialize branch '{branch}': {message}")]
    BranchFailed { branch: String, message: String },

    /// Build lock could not be acquired.
    #[error("Lock acquisition failed: {0}")]
    LockError(String),
}

impl WorkshopError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            WorkshopError::UserError(_) => exit_codes::USER_ERROR,
            WorkshopError::IoError(_) => exit_codes::IO_FAILURE,
            WorkshopError::GitError(_) => exit_codes::GIT_FAILURE,
            WorkshopError::BranchFailed { .. } => exit_codes::GIT_FAILURE,
            WorkshopError::LockError(_) => exit_codes::LOCK_FAILURE,
        }
    }
}

/// Result type alias for workshop operations.
pub type Result<T> = std::result::Result<T, WorkshopError>;
