//! Event log for workshop builds.
//!
//! Every build appends events in NDJSON format (one JSON object per line) to
//! `.git/workshop-branches/events.ndjson`. The log lives inside the git
//! directory, so it is never swept into an assignment branch by `git add --all`.
//!
//! # Event Format
//!
//! - `ts`: RFC3339 timestamp
//! - `action`: assemble, branch_created, branch_failed, materialize
//! - `actor`: `user@HOST`
//! - `branch`: branch identifier for per-branch events
//! - `details`: freeform object with action-specific details
//!
//! The log is an audit trail, not build state: failing to append is reported
//! as a warning by [`record_event`] and never fails a build.

use crate::context::RepoContext;
use crate::error::{Result, WorkshopError};
use crate::locks::get_owner_string;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;

/// Actions that can be logged as events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Staging directory assembled
    Assemble,
    /// One orphan branch committed
    BranchCreated,
    /// A materialize step failed for one branch
    BranchFailed,
    /// Every staged branch materialized
    Materialize,
}

/// An event record for the build log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// RFC3339 timestamp when the event occurred.
    pub ts: DateTime<Utc>,

    /// The action that was performed.
    pub action: EventAction,

    /// The actor who performed the action (e.g., `user@HOST`).
    pub actor: String,

    /// Branch identifier for per-branch events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// Freeform details object with action-specific information.
    pub details: Value,
}

impl Event {
    /// Create a new event stamped with the current time and actor.
    pub fn new(action: EventAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: get_owner_string(),
            branch: None,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    /// Set the branch identifier for this event.
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Set the details object for this event.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            WorkshopError::IoError(format!("failed to serialize event to JSON: {}", e))
        })
    }
}

/// Append an event to the repository's event log.
///
/// The file and its directory are created if missing. Each append writes
/// exactly one line and syncs it to disk.
pub fn append_event(repo: &RepoContext, event: &Event) -> Result<()> {
    let events_file = repo.events_file();
    let json_line = event.to_ndjson_line()?;

    let state_dir = repo.state_dir();
    if !state_dir.exists() {
        fs::create_dir_all(&state_dir).map_err(|e| {
            WorkshopError::IoError(format!(
                "failed to create state directory '{}': {}",
                state_dir.display(),
                e
            ))
        })?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&events_file)
        .map_err(|e| {
            WorkshopError::IoError(format!(
                "failed to open events file '{}': {}",
                events_file.display(),
                e
            ))
        })?;

    writeln!(file, "{}", json_line).map_err(|e| {
        WorkshopError::IoError(format!(
            "failed to write event to '{}': {}",
            events_file.display(),
            e
        ))
    })?;

    file.sync_all().map_err(|e| {
        WorkshopError::IoError(format!(
            "failed to sync events file '{}': {}",
            events_file.display(),
            e
        ))
    })?;

    Ok(())
}

/// Append an event, downgrading any failure to a warning on stderr.
pub fn record_event(repo: &RepoContext, event: &Event) {
    if let Err(e) = append_event(repo, event) {
        eprintln!("Warning: failed to log {:?} event: {}", event.action, e);
    }
}
