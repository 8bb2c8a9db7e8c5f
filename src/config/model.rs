//! Config struct definition and default implementation.

use serde::{Deserialize, Serialize};

/// File name of the workshop configuration, relative to the workshop root.
pub const CONFIG_FILE_NAME: &str = "workshop.yaml";

/// Configuration for a workshop.
///
/// This struct represents the contents of `workshop.yaml`. The file is
/// optional; every field has a default matching the conventional layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Layout settings
    // =========================================================================
    /// Directory holding one subdirectory per branch (default: "branches").
    #[serde(default = "default_branches_dir")]
    pub branches_dir: String,

    /// Directory with files common to every branch (default: "shared").
    #[serde(default = "default_shared_dir")]
    pub shared_dir: String,

    /// Staging directory rebuilt on every assembly (default: "target").
    #[serde(default = "default_staging_dir")]
    pub staging_dir: String,

    // =========================================================================
    // Git settings
    // =========================================================================
    /// Branch to return to after each assignment branch is built.
    ///
    /// When unset, the branch checked out at the start of the build is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_branch: Option<String>,

    /// Message of the single commit on every assignment branch.
    #[serde(default = "default_commit_message")]
    pub commit_message: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            branches_dir: default_branches_dir(),
            shared_dir: default_shared_dir(),
            staging_dir: default_staging_dir(),
            main_branch: None,
            commit_message: default_commit_message(),
        }
    }
}

fn default_branches_dir() -> String {
    "branches".to_string()
}

fn default_shared_dir() -> String {
    "shared".to_string()
}

fn default_staging_dir() -> String {
    "target".to_string()
}

fn default_commit_message() -> String {
    "Created branch".to_string()
}
