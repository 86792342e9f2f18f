//! Read-only queries over local branches, answered through libgit2.
//!
//! Branch cleanup needs to know which branches are fully merged and which
//! remote each one tracks. Mutations still go through the `git` CLI.

use std::path::{Path, PathBuf};

use git2::{BranchType, ErrorCode, Repository};

use crate::{mlog_debug, Result};

/// A local branch fully contained in HEAD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedBranch {
    pub name: String,
    /// Value of `branch.<name>.remote`, if configured.
    pub remote: Option<String>,
}

pub struct GitBranches {
    repo_path: PathBuf,
}

impl GitBranches {
    /// # Errors
    /// Returns an error if the path is not inside a git repository.
    pub fn new(repo_path: &Path) -> Result<Self> {
        mlog_debug!("GitBranches::new path={}", repo_path.display());
        let _ = Repository::discover(repo_path)?;
        Ok(Self {
            repo_path: repo_path.to_path_buf(),
        })
    }

    fn repo(&self) -> Result<Repository> {
        Ok(Repository::discover(&self.repo_path)?)
    }

    /// Short name of the checked-out branch, `None` on a detached HEAD.
    pub fn current_branch(&self) -> Result<Option<String>> {
        let repo = self.repo()?;
        let head = repo.head()?;
        if head.is_branch() {
            Ok(head.shorthand().map(String::from))
        } else {
            Ok(None)
        }
    }

    /// The remote a branch tracks (`branch.<name>.remote`).
    pub fn upstream_remote(&self, branch: &str) -> Result<Option<String>> {
        let repo = self.repo()?;
        let config = repo.config()?.snapshot()?;
        let key = format!("branch.{}.remote", branch);
        match config.get_string(&key) {
            Ok(remote) => Ok(Some(remote)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Local branches whose tip is HEAD or an ancestor of it, excluding the
    /// checked-out branch. Equivalent to `git branch --merged` minus `*`.
    pub fn merged_branches(&self) -> Result<Vec<MergedBranch>> {
        let repo = self.repo()?;
        let head_oid = repo.head()?.peel_to_commit()?.id();
        let current = self.current_branch()?;

        let mut merged = Vec::new();
        for branch_result in repo.branches(Some(BranchType::Local))? {
            let (branch, _) = branch_result?;
            let Some(name) = branch.name()?.map(String::from) else {
                continue;
            };
            if current.as_deref() == Some(name.as_str()) {
                continue;
            }
            let Some(tip) = branch.get().target() else {
                continue;
            };
            if tip == head_oid || repo.graph_descendant_of(head_oid, tip)? {
                let remote = self.upstream_remote(&name)?;
                merged.push(MergedBranch { name, remote });
            }
        }

        merged.sort_by(|a, b| a.name.cmp(&b.name));
        mlog_debug!("merged_branches: {} found", merged.len());
        Ok(merged)
    }
}
