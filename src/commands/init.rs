//! Implementation of the `init` command.
//!
//! Creates `branches/`, optionally `shared/`, and a commented default
//! `workshop.yaml`. Running it again never removes or overwrites anything.

use crate::cli::InitArgs;
use crate::config::{CONFIG_FILE_NAME, Config};
use crate::context::WorkshopContext;
use crate::error::Result;
use crate::fs::io_error;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_HEADER: &str = "\
# Workshop configuration for workshop-branches.
# Every field is optional; the values below are the defaults.
#
# Branch to return to after building each assignment branch.
# Defaults to the branch checked out when `build` starts.
# main_branch: main
";

/// Execute the `init` command.
pub fn cmd_init(args: InitArgs) -> Result<()> {
    let directory = args.directory.unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&directory).map_err(|e| io_error("create directory", &directory, e))?;

    let ctx = WorkshopContext::resolve_from(&directory)?;

    let mut created = Vec::new();
    if create_dir(&ctx.branches_dir)? {
        created.push(format!("{}/", ctx.config.branches_dir));
    }
    if args.shared_dir && create_dir(&ctx.shared_dir)? {
        created.push(format!("{}/", ctx.config.shared_dir));
    }
    if write_default_config(&ctx.config_path())? {
        created.push(CONFIG_FILE_NAME.to_string());
    }

    println!("Initialized new workshop in {}", ctx.source_dir.display());
    if !created.is_empty() {
        println!();
        println!("Created:");
        for entry in &created {
            println!("  {}", entry);
        }
    }
    println!();
    println!(
        "Add one directory per assignment under {}/ and run `workshop-branches build`.",
        ctx.config.branches_dir
    );

    Ok(())
}

/// Create `path` if missing. Returns whether it was created.
fn create_dir(path: &Path) -> Result<bool> {
    if path.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(path).map_err(|e| io_error("create directory", path, e))?;
    Ok(true)
}

/// Write the default config file if missing. Returns whether it was written.
fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    let content = format!("{}{}", CONFIG_HEADER, Config::default().to_yaml()?);
    fs::write(path, content).map_err(|e| io_error("write", path, e))?;
    Ok(true)
}
