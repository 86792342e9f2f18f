//! Test fixtures for integration tests.
//!
//! Provides helpers for:
//! - Creating a bare origin repository with a working clone
//! - Publishing topic branches to origin
//! - Building a `Workflow` wired to a no-op difftool

use std::path::{Path, PathBuf};
use std::process::Command;

use git2::{BranchType, Repository};
use tempfile::TempDir;

use mergetron::config::Config;
use mergetron::git::Git;
use mergetron::{SessionState, TestHook, Workflow};

/// Run git in `dir`, panicking with its stderr on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A bare origin plus a clone that tracks it.
pub struct TestRemote {
    /// The temporary directory holding both repositories.
    pub temp_dir: TempDir,
    /// Path to the bare origin repository.
    pub origin: PathBuf,
    /// Path to the working clone.
    pub work: PathBuf,
}

impl TestRemote {
    /// Create origin and a clone with one pushed commit.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().to_path_buf();

        git(&root, &["init", "--bare", "origin.git"]);
        git(&root, &["clone", "origin.git", "work"]);

        let origin = root.join("origin.git");
        let work = root.join("work");

        for (key, value) in [
            ("user.email", "test@test.com"),
            ("user.name", "Test User"),
            ("commit.gpgsign", "false"),
            ("pull.rebase", "false"),
            ("difftool.noop.cmd", "true"),
            ("difftool.prompt", "false"),
        ] {
            git(&work, &["config", key, value]);
        }

        std::fs::write(work.join("README.md"), "# Test Repository\n").expect("Failed to write README");
        git(&work, &["add", "."]);
        git(&work, &["commit", "-m", "Initial commit"]);
        git(&work, &["push", "-u", "origin", "HEAD"]);

        Self {
            temp_dir,
            origin,
            work,
        }
    }

    /// Commit `file` on a new branch `name`, push it to origin with
    /// tracking, and return to the previous branch.
    pub fn publish_branch(&self, name: &str, file: &str, content: &str) {
        git(&self.work, &["checkout", "-b", name]);
        std::fs::write(self.work.join(file), content).expect("Failed to write file");
        git(&self.work, &["add", file]);
        git(&self.work, &["commit", "-m", &format!("Add {}", file)]);
        git(&self.work, &["push", "-u", "origin", name]);
        git(&self.work, &["checkout", "-"]);
    }

    /// The checked-out branch of the clone.
    pub fn current_branch(&self) -> String {
        git(&self.work, &["rev-parse", "--abbrev-ref", "HEAD"])
    }

    pub fn head(&self) -> String {
        git(&self.work, &["rev-parse", "HEAD"])
    }

    /// A workflow on the clone with the no-op difftool and no test command.
    pub fn workflow(&self) -> Workflow {
        self.workflow_with(Config::default())
    }

    pub fn workflow_with(&self, mut config: Config) -> Workflow {
        config.difftool = Some("noop".to_string());
        let git = Git::discover(&self.work).expect("Failed to discover repo");
        Workflow::new(git, config).with_test_hook(TestHook::default())
    }

    pub fn session(&self) -> SessionState {
        SessionState::in_git_dir(&self.work.join(".git"))
    }

    pub fn branch_exists(&self, name: &str) -> bool {
        let repo = Repository::open(&self.work).expect("Failed to open clone");
        let found = repo.find_branch(name, BranchType::Local);
        found.is_ok()
    }

    pub fn branch_target(&self, name: &str) -> Option<String> {
        let repo = Repository::open(&self.work).expect("Failed to open clone");
        let branch = repo.find_branch(name, BranchType::Local).ok()?;
        branch.get().target().map(|oid| oid.to_string())
    }

    /// Whether origin has a branch called `name`.
    pub fn origin_has_branch(&self, name: &str) -> bool {
        let repo = Repository::open_bare(&self.origin).expect("Failed to open origin");
        let found = repo.find_branch(name, BranchType::Local);
        found.is_ok()
    }

    /// Commit SHA of `name` on origin.
    pub fn origin_target(&self, name: &str) -> Option<String> {
        let repo = Repository::open_bare(&self.origin).expect("Failed to open origin");
        let branch = repo.find_branch(name, BranchType::Local).ok()?;
        branch.get().target().map(|oid| oid.to_string())
    }
}

impl Default for TestRemote {
    fn default() -> Self {
        Self::new()
    }
}
