//! Thin wrapper over the `git` command-line tool.
//!
//! Every workflow step goes through [`Git`]. Commands run from the repository
//! top level; their exit status is the only result channel.

use std::path::{Path, PathBuf};

use crate::process::{self, CommandOutput, Detached};
use crate::{mlog_debug, Error, Result};

#[derive(Debug, Clone)]
pub struct Git {
    binary: PathBuf,
    root: PathBuf,
    echo: bool,
}

impl Git {
    /// Find `git` on PATH.
    pub fn locate() -> Result<PathBuf> {
        which::which("git").map_err(|_| Error::GitNotFound)
    }

    /// Bind to the repository containing `start`, using the `git` on PATH.
    pub fn discover(start: &Path) -> Result<Self> {
        Self::discover_with_binary(Self::locate()?, start)
    }

    /// Bind to the repository containing `start` with a specific binary.
    ///
    /// Runs `git rev-parse --show-toplevel` from `start`; the reported
    /// top level becomes the working directory of every later command.
    pub fn discover_with_binary(binary: PathBuf, start: &Path) -> Result<Self> {
        mlog_debug!("Git::discover start={}", start.display());
        let out = process::run(&binary, &["rev-parse", "--show-toplevel"], start)?;
        if !out.success() {
            return Err(Error::NotARepository(format!(
                "{}: {}",
                start.display(),
                out.stderr.trim()
            )));
        }
        let root = PathBuf::from(out.stdout.trim());
        mlog_debug!("Repository root: {}", root.display());
        Ok(Self::new(binary, root))
    }

    /// Use `binary` against an already known repository root.
    pub fn new(binary: PathBuf, root: PathBuf) -> Self {
        Self {
            binary,
            root,
            echo: false,
        }
    }

    /// Print each command line to stdout before running it.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run a git command to completion; a non-zero exit is an error.
    pub fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        if self.echo {
            println!("{}", process::display_command(&self.binary, args));
        }
        process::run(&self.binary, args, &self.root)?.check()
    }

    /// Run a git command and hand back the output whatever the exit status.
    pub fn try_run(&self, args: &[&str]) -> Result<CommandOutput> {
        process::run(&self.binary, args, &self.root)
    }

    /// Start a git command without waiting for it.
    pub fn spawn(&self, args: &[&str]) -> Result<Detached> {
        if self.echo {
            println!("{} &", process::display_command(&self.binary, args));
        }
        process::spawn_detached(&self.binary, args, &self.root)
    }

    /// Absolute path of the repository metadata directory (`.git`).
    pub fn git_dir(&self) -> Result<PathBuf> {
        let out = self.try_run(&["rev-parse", "--absolute-git-dir"])?.check()?;
        Ok(PathBuf::from(out.stdout.trim()))
    }

    /// Commit id of local branch `name`, or `None` if there is no such branch.
    pub fn branch_target(&self, name: &str) -> Result<Option<String>> {
        let refname = format!("refs/heads/{}", name);
        let out = self.try_run(&["rev-parse", "--verify", "--quiet", &refname])?;
        if !out.success() {
            return Ok(None);
        }
        Ok(Some(out.stdout.trim().to_string()))
    }

    pub fn branch_exists(&self, name: &str) -> Result<bool> {
        Ok(self.branch_target(name)?.is_some())
    }

    pub fn create_branch(&self, name: &str) -> Result<()> {
        self.run(&["branch", name])?;
        Ok(())
    }

    /// Recreate `name` pointing at `target`.
    pub fn restore_branch(&self, name: &str, target: &str) -> Result<()> {
        self.run(&["branch", name, target])?;
        Ok(())
    }

    /// `git branch -d`: refuses to delete a branch that is not merged.
    pub fn delete_branch(&self, name: &str) -> Result<()> {
        self.run(&["branch", "-d", name])?;
        Ok(())
    }

    /// Pull `branch` from `remote` into the current branch.
    pub fn pull(&self, remote: &str, branch: &str) -> Result<()> {
        self.run(&["pull", "--no-edit", remote, branch])?;
        Ok(())
    }

    /// `git push -u` for the current branch.
    pub fn push_upstream(&self) -> Result<()> {
        self.run(&["push", "-u"])?;
        Ok(())
    }

    /// Delete `branch` on `remote` (`git push <remote> :<branch>`).
    pub fn push_delete(&self, remote: &str, branch: &str) -> Result<()> {
        let refspec = format!(":{}", branch);
        self.run(&["push", remote, &refspec])?;
        Ok(())
    }

    /// Open a directory diff of the working tree against `base`, detached.
    pub fn difftool(&self, base: &str, tool: Option<&str>) -> Result<Detached> {
        let tool_arg = tool.map(|t| format!("--tool={}", t));
        let mut args = vec!["difftool", "-d"];
        if let Some(ref t) = tool_arg {
            args.push(t);
        }
        args.push(base);
        self.spawn(&args)
    }

    pub fn remotes(&self) -> Result<Vec<String>> {
        let out = self.run(&["remote"])?;
        Ok(out
            .stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    pub fn remote_prune(&self, remote: &str) -> Result<()> {
        self.run(&["remote", "prune", remote])?;
        Ok(())
    }

    pub fn gc(&self) -> Result<()> {
        self.run(&["gc"])?;
        Ok(())
    }
}
