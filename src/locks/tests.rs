//! Tests for the build lock.

use super::*;
use crate::test_support::create_test_repo;
use chrono::Duration;

fn metadata(action: BuildAction) -> LockMetadata {
    LockMetadata::new(action, Path::new("/course/target"), "main")
}

#[test]
fn test_lock_metadata_creation() {
    let meta = metadata(BuildAction::Build);

    assert!(meta.owner.contains('@'));
    assert_eq!(meta.pid, std::process::id());
    assert_eq!(meta.action, BuildAction::Build);
    assert_eq!(meta.staging_dir, PathBuf::from("/course/target"));
    assert_eq!(meta.main_branch, "main");
}

#[test]
fn test_lock_metadata_age_string() {
    let mut meta = metadata(BuildAction::Build);

    meta.created_at = Utc::now() - Duration::minutes(5);
    assert_eq!(meta.age_string(), "5m");

    meta.created_at = Utc::now() - Duration::minutes(125);
    assert_eq!(meta.age_string(), "2h 5m");

    meta.created_at = Utc::now() - Duration::hours(50);
    assert_eq!(meta.age_string(), "2d 2h");
}

#[test]
fn test_acquire_writes_build_context() {
    let temp_dir = create_test_repo();
    let repo = RepoContext::resolve_from(temp_dir.path()).unwrap();

    let lock = BuildLock::acquire(&repo, &metadata(BuildAction::Materialize)).unwrap();
    assert_eq!(lock.path(), repo.build_lock_path().as_path());

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(lock.path()).unwrap()).unwrap();
    assert_eq!(raw["action"], "materialize");
    assert_eq!(raw["staging_dir"], "/course/target");
    assert_eq!(raw["main_branch"], "main");
}

#[test]
fn test_second_acquire_names_the_running_build() {
    let temp_dir = create_test_repo();
    let repo = RepoContext::resolve_from(temp_dir.path()).unwrap();

    let _lock = BuildLock::acquire(&repo, &metadata(BuildAction::Materialize)).unwrap();
    let err = BuildLock::acquire(&repo, &metadata(BuildAction::Build)).unwrap_err();

    assert!(matches!(err, WorkshopError::LockError(_)));
    let msg = err.to_string();
    assert!(msg.contains("another build is running"));
    assert!(msg.contains("A materialize started by"));
    assert!(msg.contains("/course/target"));
    assert!(msg.contains("returning to 'main'"));
    assert!(msg.contains("build.lock"));
}

#[test]
fn test_unreadable_lock_file_still_reports_path() {
    let temp_dir = create_test_repo();
    let repo = RepoContext::resolve_from(temp_dir.path()).unwrap();
    fs::create_dir_all(repo.state_dir()).unwrap();
    fs::write(repo.build_lock_path(), "not json").unwrap();

    let err = BuildLock::acquire(&repo, &metadata(BuildAction::Build)).unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("build.lock"));
    assert!(!msg.contains("started by"));
}

#[test]
fn test_lock_released_on_drop() {
    let temp_dir = create_test_repo();
    let repo = RepoContext::resolve_from(temp_dir.path()).unwrap();

    {
        let _lock = BuildLock::acquire(&repo, &metadata(BuildAction::Build)).unwrap();
        assert!(repo.build_lock_path().exists());
    }

    assert!(!repo.build_lock_path().exists());
    assert!(BuildLock::acquire(&repo, &metadata(BuildAction::Build)).is_ok());
}

#[test]
fn test_explicit_release() {
    let temp_dir = create_test_repo();
    let repo = RepoContext::resolve_from(temp_dir.path()).unwrap();

    let lock = BuildLock::acquire(&repo, &metadata(BuildAction::Build)).unwrap();
    lock.release().unwrap();
    assert!(!repo.build_lock_path().exists());
}
