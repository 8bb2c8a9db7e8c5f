//! Exit code constants for the workshop-branches CLI.
//!
//! - 0: Success
//! - 1: User error (no branches, bad config, dirty working tree)
//! - 2: Filesystem failure (copy, directory creation)
//! - 3: Git operation failure
//! - 4: Build lock held by another process

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, missing branches, or invalid repository state.
pub const USER_ERROR: i32 = 1;

/// Filesystem failure: copying or creating the staging tree failed.
pub const IO_FAILURE: i32 = 2;

/// Git operation failure: branch deletion, orphan checkout, commit, checkout.
pub const GIT_FAILURE: i32 = 3;

/// Lock acquisition failure: another build holds the repository lock.
pub const LOCK_FAILURE: i32 = 4;
