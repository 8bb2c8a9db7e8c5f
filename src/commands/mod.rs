//! Command implementations for workshop-branches.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations.

mod assemble;
mod build;
mod init;

use crate::cli::Command;
use crate::error::Result;

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Init(args) => init::cmd_init(args),
        Command::Assemble(args) => assemble::cmd_assemble(args),
        Command::Materialize(args) => build::cmd_materialize(args),
        Command::Build(args) => build::cmd_build(args),
    }
}
