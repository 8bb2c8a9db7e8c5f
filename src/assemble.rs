//! Assembly of the staging directory.
//!
//! For every branch identifier under `branches/`, the staging directory gets
//! a subdirectory holding the shared files with the branch's own files laid
//! on top. The staging directory is deleted and rebuilt on every run, so no
//! content from a previous build survives.

use crate::context::WorkshopContext;
use crate::error::{Result, WorkshopError};
use crate::fs::{copy_tree, dir_name, list_subdirectories, recreate_dir};
use std::path::PathBuf;

/// Outcome of a successful assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyReport {
    /// The rebuilt staging directory.
    pub staging_dir: PathBuf,
    /// Branch identifiers assembled, sorted by name.
    pub branches: Vec<String>,
}

impl AssemblyReport {
    /// Number of branches assembled.
    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }
}

/// Rebuild the staging directory from the workshop source tree.
///
/// # Returns
///
/// * `Ok(AssemblyReport)` - Staging directory and the branches it holds
/// * `Err(WorkshopError::UserError)` - No branch directories were found
/// * `Err(WorkshopError::IoError)` - A copy failed; staging may be partial
pub fn assemble(ctx: &WorkshopContext) -> Result<AssemblyReport> {
    recreate_dir(&ctx.staging_dir)?;

    let branch_dirs = list_subdirectories(&ctx.branches_dir);
    if branch_dirs.is_empty() {
        return Err(WorkshopError::UserError(format!(
            "no branches found in {}",
            ctx.branches_dir.display()
        )));
    }

    let has_shared = ctx.shared_dir.is_dir();
    let mut branches = Vec::with_capacity(branch_dirs.len());

    for branch_dir in &branch_dirs {
        let branch = dir_name(branch_dir)?;
        let staged = ctx.staged_branch(branch);

        // Shared first, so branch files win on collision.
        if has_shared {
            copy_tree(&ctx.shared_dir, &staged).map_err(|e| in_branch(branch, e))?;
        }
        copy_tree(branch_dir, &staged).map_err(|e| in_branch(branch, e))?;

        branches.push(branch.to_string());
    }

    Ok(AssemblyReport {
        staging_dir: ctx.staging_dir.clone(),
        branches,
    })
}

fn in_branch(branch: &str, err: WorkshopError) -> WorkshopError {
    match err {
        WorkshopError::IoError(msg) => {
            WorkshopError::IoError(format!("assembling branch '{}': {}", branch, msg))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::test_support::{read_tree, write_file, write_sample_workshop};
    use std::fs;
    use tempfile::TempDir;

    fn workshop(temp_dir: &TempDir) -> WorkshopContext {
        WorkshopContext::resolve_from(temp_dir.path()).unwrap()
    }

    #[test]
    fn test_assemble_sample_workshop() {
        let temp_dir = TempDir::new().unwrap();
        write_sample_workshop(temp_dir.path());
        let ctx = workshop(&temp_dir);

        let report = assemble(&ctx).unwrap();

        assert_eq!(report.branch_count(), 2);
        assert_eq!(report.branches, vec!["week1", "week2"]);
        assert_eq!(report.staging_dir, ctx.staging_dir);

        let week1 = read_tree(&ctx.staged_branch("week1"));
        assert_eq!(week1.keys().collect::<Vec<_>>(), vec!["ex.py", "readme.md"]);
        assert_eq!(week1["ex.py"], b"print('week 1')\n");

        let week2 = read_tree(&ctx.staged_branch("week2"));
        assert_eq!(week2["ex.py"], b"print('week 2')\n");
        assert_eq!(week2["readme.md"], b"# Workshop\n");
    }

    #[test]
    fn test_branch_files_override_shared() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_file(&root.join("shared").join("config").join("settings.ini"), "shared");
        write_file(&root.join("shared").join("common.txt"), "common");
        write_file(&root.join("branches").join("a").join("config").join("settings.ini"), "a");
        write_file(&root.join("branches").join("a").join("config").join("extra.ini"), "extra");

        let ctx = workshop(&temp_dir);
        assemble(&ctx).unwrap();

        let staged = read_tree(&ctx.staged_branch("a"));
        assert_eq!(staged.len(), 3);
        assert_eq!(staged["config/settings.ini"], b"a");
        assert_eq!(staged["config/extra.ini"], b"extra");
        assert_eq!(staged["common.txt"], b"common");
    }

    #[test]
    fn test_missing_shared_is_treated_as_empty() {
        let temp_dir = TempDir::new().unwrap();
        write_file(&temp_dir.path().join("branches").join("solo").join("main.py"), "x");

        let ctx = workshop(&temp_dir);
        let report = assemble(&ctx).unwrap();

        assert_eq!(report.branches, vec!["solo"]);
        let staged = read_tree(&ctx.staged_branch("solo"));
        assert_eq!(staged.keys().collect::<Vec<_>>(), vec!["main.py"]);
    }

    #[test]
    fn test_empty_branch_dir_still_staged() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("branches").join("empty")).unwrap();

        let ctx = workshop(&temp_dir);
        assemble(&ctx).unwrap();

        assert!(ctx.staged_branch("empty").is_dir());
    }

    #[test]
    fn test_no_branches_is_user_error() {
        let temp_dir = TempDir::new().unwrap();
        write_file(&temp_dir.path().join("shared").join("readme.md"), "x");
        // Plain files under branches/ are not branches.
        write_file(&temp_dir.path().join("branches").join("notes.txt"), "x");

        let ctx = workshop(&temp_dir);
        let err = assemble(&ctx).unwrap_err();

        assert!(matches!(err, WorkshopError::UserError(_)));
        assert!(err.to_string().starts_with("no branches found in"));
        assert!(err.to_string().contains("branches"));
        assert!(ctx.staging_dir.is_dir());
        assert_eq!(fs::read_dir(&ctx.staging_dir).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_branches_dir_is_user_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = assemble(&workshop(&temp_dir)).unwrap_err();
        assert!(matches!(err, WorkshopError::UserError(_)));
    }

    #[test]
    fn test_stale_staging_content_is_removed() {
        let temp_dir = TempDir::new().unwrap();
        write_sample_workshop(temp_dir.path());
        let ctx = workshop(&temp_dir);

        write_file(&ctx.staging_dir.join("week0").join("old.py"), "old");
        write_file(&ctx.staged_branch("week1").join("stale.txt"), "stale");

        assemble(&ctx).unwrap();

        assert!(!ctx.staging_dir.join("week0").exists());
        assert!(!ctx.staged_branch("week1").join("stale.txt").exists());
    }

    #[test]
    fn test_assemble_twice_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        write_sample_workshop(temp_dir.path());
        let ctx = workshop(&temp_dir);

        assemble(&ctx).unwrap();
        let first = read_tree(&ctx.staging_dir);
        assemble(&ctx).unwrap();
        let second = read_tree(&ctx.staging_dir);

        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn test_source_tree_is_not_modified() {
        let temp_dir = TempDir::new().unwrap();
        write_sample_workshop(temp_dir.path());
        let ctx = workshop(&temp_dir);

        let before_shared = read_tree(&ctx.shared_dir);
        let before_branches = read_tree(&ctx.branches_dir);
        assemble(&ctx).unwrap();

        assert_eq!(read_tree(&ctx.shared_dir), before_shared);
        assert_eq!(read_tree(&ctx.branches_dir), before_branches);
    }

    #[test]
    fn test_custom_layout_from_config() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_file(&root.join("common").join("a.txt"), "a");
        write_file(&root.join("assignments").join("lab1").join("b.txt"), "b");

        let config = Config {
            branches_dir: "assignments".to_string(),
            shared_dir: "common".to_string(),
            staging_dir: "staged".to_string(),
            ..Config::default()
        };
        let ctx = WorkshopContext::with_config(root.canonicalize().unwrap(), config);

        let report = assemble(&ctx).unwrap();

        assert!(report.staging_dir.ends_with("staged"));
        let staged = read_tree(&ctx.staged_branch("lab1"));
        assert_eq!(staged.keys().collect::<Vec<_>>(), vec!["a.txt", "b.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_never_reach_staging() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        write_sample_workshop(temp_dir.path());
        let root = temp_dir.path();
        symlink(root.join("shared").join("readme.md"), root.join("shared").join("link.md"))
            .unwrap();
        symlink(
            root.join("branches").join("week1").join("ex.py"),
            root.join("branches").join("week1").join("link.py"),
        )
        .unwrap();

        let ctx = workshop(&temp_dir);
        assemble(&ctx).unwrap();

        for branch in ["week1", "week2"] {
            let staged = ctx.staged_branch(branch);
            assert!(fs::symlink_metadata(staged.join("link.md")).is_err());
            assert!(fs::symlink_metadata(staged.join("link.py")).is_err());
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_permissions_survive_assembly() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        write_sample_workshop(temp_dir.path());
        let script = temp_dir.path().join("shared").join("run.sh");
        write_file(&script, "#!/bin/sh\n");
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let ctx = workshop(&temp_dir);
        assemble(&ctx).unwrap();

        let staged = ctx.staged_branch("week2").join("run.sh");
        let mode = fs::metadata(&staged).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o755);
    }
}
