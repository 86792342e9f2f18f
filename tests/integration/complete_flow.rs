//! Finishing a merge: session removal, push and branch cleanup.

use mergetron::config::{CleanupConfig, Config};
use mergetron::Error;

use crate::fixtures::{git, TestRemote};

#[test]
fn test_complete_removes_state_and_pushes() {
    let remote = TestRemote::new();
    remote.publish_branch("feature-a", "a.txt", "a\n");
    let workflow = remote.workflow();
    workflow.merge(&["origin/feature-a"]).unwrap();

    let report = workflow.complete().expect("complete should succeed");

    assert!(report.skipped);
    assert!(!remote.session().exists());
    assert!(!remote.branch_exists("savepoint"));
    let current = remote.current_branch();
    assert_eq!(remote.origin_target(&current), Some(remote.head()));
}

#[test]
fn test_complete_without_merge_fails() {
    let remote = TestRemote::new();
    let result = remote.workflow().complete();

    assert!(matches!(result, Err(Error::NoSession(_))));
}

#[test]
fn test_complete_without_savepoint_fails() {
    let remote = TestRemote::new();
    remote.session().record(&["origin/feature-a"]).unwrap();

    let result = remote.workflow().complete();

    assert!(matches!(result, Err(Error::MissingSavepoint(ref s)) if s == "savepoint"));
    assert!(remote.session().exists());
}

#[test]
fn test_complete_after_failed_push_can_be_retried() {
    let remote = TestRemote::new();
    remote.publish_branch("feature-a", "a.txt", "a\n");
    let workflow = remote.workflow();
    workflow.merge(&["origin/feature-a"]).unwrap();
    let savepoint = remote.branch_target("savepoint");

    let origin_url = remote.origin.to_string_lossy().to_string();
    let missing = remote.temp_dir.path().join("missing.git");
    git(&remote.work, &["remote", "set-url", "origin", &missing.to_string_lossy()]);

    let result = workflow.complete();
    assert!(matches!(result, Err(Error::CommandFailed { .. })));
    assert!(remote.session().exists());
    assert_eq!(remote.branch_target("savepoint"), savepoint);

    git(&remote.work, &["remote", "set-url", "origin", &origin_url]);
    workflow.complete().expect("retry should succeed");

    assert!(!remote.session().exists());
    assert!(!remote.branch_exists("savepoint"));
    let current = remote.current_branch();
    assert_eq!(remote.origin_target(&current), Some(remote.head()));
}

#[test]
fn test_complete_twice_fails() {
    let remote = TestRemote::new();
    remote.publish_branch("feature-a", "a.txt", "a\n");
    let workflow = remote.workflow();
    workflow.merge(&["origin/feature-a"]).unwrap();
    workflow.complete().unwrap();

    assert!(matches!(workflow.complete(), Err(Error::NoSession(_))));
}

#[test]
fn test_complete_then_merge_again() {
    let remote = TestRemote::new();
    remote.publish_branch("feature-a", "a.txt", "a\n");
    remote.publish_branch("feature-b", "b.txt", "b\n");
    let workflow = remote.workflow();

    workflow.merge(&["origin/feature-a"]).unwrap();
    workflow.complete().unwrap();
    workflow.merge(&["origin/feature-b"]).unwrap();

    assert_eq!(remote.session().load().unwrap(), vec!["origin/feature-b"]);
    assert!(remote.work.join("b.txt").exists());
}

#[test]
fn test_cleanup_deletes_merged_tracking_branches() {
    let remote = TestRemote::new();
    remote.publish_branch("feature-a", "a.txt", "a\n");
    remote.publish_branch("feature-b", "b.txt", "b\n");
    // Merged later, but protected.
    git(&remote.work, &["branch", "production"]);
    // Merged, no upstream.
    git(&remote.work, &["branch", "scratch"]);

    let config = Config {
        cleanup: CleanupConfig {
            enabled: true,
            gc: false,
            ..CleanupConfig::default()
        },
        ..Config::default()
    };
    let workflow = remote.workflow_with(config);
    workflow.merge(&["origin/feature-a"]).unwrap();
    let report = workflow.complete().unwrap();

    assert!(!report.skipped);
    assert!(report.is_success(), "failures: {:?}", report.failed);
    assert_eq!(report.deleted, vec!["feature-a".to_string()]);
    assert_eq!(report.local_only, vec!["scratch".to_string()]);
    assert_eq!(report.pruned_remotes, vec!["origin".to_string()]);

    assert!(!remote.branch_exists("feature-a"));
    assert!(!remote.origin_has_branch("feature-a"));
    // Not merged into HEAD, so untouched.
    assert!(remote.branch_exists("feature-b"));
    assert!(remote.origin_has_branch("feature-b"));
    assert!(remote.branch_exists("production"));
    assert!(remote.branch_exists("scratch"));
}
