//! Merge session state persisted between invocations.
//!
//! A session is the ordered list of `remote/branch` names being merged, kept
//! as a JSON array in the repository metadata directory. The savepoint branch
//! lives in git itself; only its name is known here.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::{mlog_debug, Error, Result};

/// File name of the session record inside the git directory.
pub const SESSION_FILE: &str = "mergetron-branches";

/// `remote/branch`: the first slash separates the two, the branch part may
/// itself contain slashes.
static BRANCH_SPEC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^/\s]+)/(\S+)$").unwrap());

/// A branch to pull, decomposed into remote and branch name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchSpec {
    pub remote: String,
    pub branch: String,
}

impl BranchSpec {
    pub fn parse(name: &str) -> Result<Self> {
        let caps = BRANCH_SPEC_RE
            .captures(name)
            .ok_or_else(|| Error::InvalidBranchName(name.to_string()))?;
        let remote = caps[1].to_string();
        let branch = caps[2].to_string();
        if branch.starts_with('/') || branch.ends_with('/') {
            return Err(Error::InvalidBranchName(name.to_string()));
        }
        Ok(Self { remote, branch })
    }

    /// Parse every name, failing on the first one that does not split.
    pub fn parse_all<S: AsRef<str>>(names: &[S]) -> Result<Vec<Self>> {
        names.iter().map(|n| Self::parse(n.as_ref())).collect()
    }
}

impl fmt::Display for BranchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.remote, self.branch)
    }
}

/// The on-disk record of the merge in progress.
#[derive(Debug, Clone)]
pub struct SessionState {
    path: PathBuf,
}

impl SessionState {
    /// Session record inside `git_dir` (normally `<repo>/.git`).
    pub fn in_git_dir(git_dir: &Path) -> Self {
        Self {
            path: git_dir.join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Write `branches` as a JSON array, replacing any previous record.
    pub fn record<S: AsRef<str>>(&self, branches: &[S]) -> Result<()> {
        mlog_debug!(
            "SessionState::record path={} count={}",
            self.path.display(),
            branches.len()
        );
        let names: Vec<&str> = branches.iter().map(|b| b.as_ref()).collect();
        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer(&mut writer, &names)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Read the recorded branch names.
    ///
    /// # Errors
    /// Returns `Error::NoSession` when no merge has been started.
    pub fn load(&self) -> Result<Vec<String>> {
        if !self.exists() {
            return Err(Error::NoSession(self.path.clone()));
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Delete the record.
    ///
    /// # Errors
    /// Returns `Error::NoSession` when there is nothing to delete.
    pub fn clear(&self) -> Result<()> {
        mlog_debug!("SessionState::clear path={}", self.path.display());
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NoSession(self.path.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
