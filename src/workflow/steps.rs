use crate::cleanup::{BranchCleaner, CleanupReport};
use crate::config::Config;
use crate::git::Git;
use crate::process::Detached;
use crate::session::{BranchSpec, SessionState};
use crate::workflow::hook::{TestHook, TestOutcome};
use crate::{mlog, mlog_debug, mlog_warn, Error, Result};

/// What a review launched: the detached diff viewer and the test result.
#[derive(Debug, Clone)]
pub struct Review {
    pub difftool: Detached,
    pub tests: TestOutcome,
}

/// Drives the workflow steps against one repository checkout.
pub struct Workflow {
    git: Git,
    config: Config,
    test_hook: TestHook,
}

impl Workflow {
    pub fn new(git: Git, config: Config) -> Self {
        let test_hook = TestHook::new(config.effective_test_command());
        Self {
            git,
            config,
            test_hook,
        }
    }

    /// Replace the test hook resolved from the configuration.
    pub fn with_test_hook(mut self, test_hook: TestHook) -> Self {
        self.test_hook = test_hook;
        self
    }

    pub fn savepoint(&self) -> &str {
        self.config.effective_savepoint()
    }

    /// The session record for this checkout.
    pub fn session(&self) -> Result<SessionState> {
        Ok(SessionState::in_git_dir(&self.git.git_dir()?))
    }

    /// Start a merge: savepoint, record, pull each branch in order, review.
    ///
    /// Every name is split into remote and branch before anything runs, so
    /// an empty list or a malformed name leaves the repository untouched.
    /// A failing pull stops the sequence with the savepoint and the record
    /// still in place.
    pub fn merge<S: AsRef<str>>(&self, branches: &[S]) -> Result<Review> {
        if branches.is_empty() {
            return Err(Error::NoBranches);
        }
        let specs = BranchSpec::parse_all(branches)?;

        let savepoint = self.savepoint();
        if self.git.branch_exists(savepoint)? {
            return Err(Error::SavepointExists(savepoint.to_string()));
        }
        self.git.create_branch(savepoint)?;
        mlog!("Created savepoint {}", savepoint);

        let session = self.session()?;
        session.record(branches)?;
        mlog!(
            "Recorded {} branch(es) in {}",
            branches.len(),
            session.path().display()
        );

        for spec in &specs {
            mlog!("Pulling {}", spec);
            self.git.pull(&spec.remote, &spec.branch)?;
        }

        self.review()
    }

    /// Open the diff viewer against the savepoint and run the test hook.
    pub fn review(&self) -> Result<Review> {
        let difftool = self
            .git
            .difftool(self.savepoint(), self.config.difftool.as_deref())?;
        mlog_debug!("difftool started: {}", difftool);
        let tests = self.test_hook.run(self.git.root())?;
        Ok(Review { difftool, tests })
    }

    /// Finish a merge: delete the savepoint, push, drop the record, clean up.
    ///
    /// Both the record and the savepoint must exist before anything is
    /// touched. If the push fails the savepoint is recreated and the record
    /// kept, so `complete` can simply be run again.
    pub fn complete(&self) -> Result<CleanupReport> {
        let session = self.session()?;
        if !session.exists() {
            return Err(Error::NoSession(session.path().to_path_buf()));
        }
        let savepoint = self.savepoint();
        let Some(target) = self.git.branch_target(savepoint)? else {
            return Err(Error::MissingSavepoint(savepoint.to_string()));
        };

        self.git.delete_branch(savepoint)?;
        mlog!("Deleted savepoint {} (was {})", savepoint, target);

        if let Err(e) = self.git.push_upstream() {
            mlog_warn!("Push failed, restoring savepoint {}", savepoint);
            self.git.restore_branch(savepoint, &target)?;
            return Err(e);
        }
        mlog!("Pushed current branch");

        session.clear()?;
        mlog!("Removed {}", session.path().display());

        BranchCleaner::new(&self.git, &self.config.cleanup).run()
    }
}
