//! CLI argument parsing for workshop-branches.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Maintain a workshop Git repository with one orphan branch per assignment.
///
/// A workshop keeps every assignment in `branches/<name>/` and files common
/// to all of them in `shared/`. `assemble` merges the two into `target/`;
/// `build` additionally turns each `target/<name>/` into a branch `<name>`
/// whose single commit contains exactly those files.
#[derive(Parser, Debug)]
#[command(name = "workshop-branches")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the workshop folder structure.
    ///
    /// Creates `branches/`, `shared/` (unless disabled) and a default
    /// `workshop.yaml`. Existing content is left untouched.
    Init(InitArgs),

    /// Assemble all files needed for the workshop into the staging directory.
    ///
    /// The staging directory is deleted and rebuilt from scratch.
    Assemble(WorkshopArgs),

    /// Turn every staged directory into an orphan branch.
    ///
    /// Rewrites the repository's working tree; requires a clean repository.
    Materialize(BranchArgs),

    /// Assemble, then create branches if assembly succeeded.
    Build(BranchArgs),
}

/// Arguments for the `init` command.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Workshop directory (defaults to the current directory).
    pub directory: Option<PathBuf>,

    /// Whether to create the shared directory.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub shared_dir: bool,
}

/// Arguments for commands that only read the workshop layout.
#[derive(Parser, Debug)]
pub struct WorkshopArgs {
    /// Workshop directory (defaults to the current directory).
    pub directory: Option<PathBuf>,
}

/// Arguments for commands that write branches.
#[derive(Parser, Debug)]
pub struct BranchArgs {
    /// Workshop directory (defaults to the current directory).
    pub directory: Option<PathBuf>,

    /// Branch to return to after each assignment branch is built.
    ///
    /// Overrides `main_branch` in workshop.yaml. Defaults to the branch
    /// checked out when the command starts.
    #[arg(long)]
    pub main_branch: Option<String>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
