//! Post-merge branch cleanup.
//!
//! After a merge is completed, branches that are now fully contained in HEAD
//! are deleted both on their remote and locally. Branches without an upstream
//! are only reported. Remotes are pruned and the repository garbage-collected
//! afterwards. Nothing happens unless `[cleanup] enabled = true`.

use regex::Regex;

use crate::config::CleanupConfig;
use crate::git::Git;
use crate::git_branches::GitBranches;
use crate::{mlog, mlog_debug, mlog_warn, Error, Result};

/// Report of cleanup operations performed.
#[derive(Debug, Clone, Default)]
pub struct CleanupReport {
    /// Cleanup is disabled in the configuration; nothing was touched.
    pub skipped: bool,
    /// Branches deleted on the remote and locally.
    pub deleted: Vec<String>,
    /// Branches that could not be deleted, with the reason.
    pub failed: Vec<(String, String)>,
    /// Merged branches with no upstream remote; left alone.
    pub local_only: Vec<String>,
    /// Remotes that were pruned.
    pub pruned_remotes: Vec<String>,
}

impl CleanupReport {
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// Whether all cleanup operations succeeded.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Deletes merged branches according to a [`CleanupConfig`].
pub struct BranchCleaner<'a> {
    git: &'a Git,
    config: &'a CleanupConfig,
}

impl<'a> BranchCleaner<'a> {
    pub fn new(git: &'a Git, config: &'a CleanupConfig) -> Self {
        Self { git, config }
    }

    pub fn run(&self) -> Result<CleanupReport> {
        if !self.config.enabled {
            mlog!("Branch cleanup disabled, skipping");
            return Ok(CleanupReport::skipped());
        }

        let protected = compile_protected(&self.config.protected)?;
        let merged = GitBranches::new(self.git.root())?.merged_branches()?;
        let mut report = CleanupReport::default();

        for branch in merged {
            if is_protected(&protected, &branch.name) {
                mlog_debug!("cleanup: keeping {}", branch.name);
                continue;
            }
            match branch.remote.as_deref() {
                Some(remote) if remote == self.config.remote => {
                    match self.delete_everywhere(remote, &branch.name) {
                        Ok(()) => {
                            mlog!("Deleted merged branch {}", branch.name);
                            report.deleted.push(branch.name);
                        }
                        Err(e) => {
                            mlog_warn!("Failed to delete branch '{}': {}", branch.name, e);
                            report.failed.push((branch.name, e.to_string()));
                        }
                    }
                }
                Some(other) => {
                    mlog_debug!("cleanup: {} tracks {}, not {}", branch.name, other, self.config.remote);
                }
                None => report.local_only.push(branch.name),
            }
        }

        for remote in self.git.remotes()? {
            match self.git.remote_prune(&remote) {
                Ok(()) => report.pruned_remotes.push(remote),
                Err(e) => mlog_warn!("Failed to prune remote '{}': {}", remote, e),
            }
        }

        if self.config.gc {
            if let Err(e) = self.git.gc() {
                mlog_warn!("git gc failed: {}", e);
            }
        }

        mlog!(
            "Cleanup finished: {} deleted, {} failed, {} local-only",
            report.deleted_count(),
            report.failed_count(),
            report.local_only.len()
        );
        Ok(report)
    }

    /// Delete on the remote first; only a successful remote delete is
    /// followed by the local one.
    fn delete_everywhere(&self, remote: &str, branch: &str) -> Result<()> {
        self.git.push_delete(remote, branch)?;
        self.git.delete_branch(branch)
    }
}

fn compile_protected(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("^(?:{})$", p)).map_err(Error::from))
        .collect()
}

fn is_protected(protected: &[Regex], name: &str) -> bool {
    protected.iter().any(|re| re.is_match(name))
}
