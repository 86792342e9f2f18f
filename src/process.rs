//! Subprocess plumbing shared by the git wrapper and the test hook.
//!
//! Two ways to launch a program:
//! - [`run`] waits for it and captures stdout/stderr into a [`CommandOutput`].
//! - [`spawn_detached`] starts it with null stdio and never waits, returning a
//!   [`Detached`] handle that only records what was started.

use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::{mlog_debug, mlog_trace, Error, Result};

/// Result of a command that ran to completion.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub command: String,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Turn a non-zero exit into `Error::CommandFailed`.
    pub fn check(self) -> Result<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(Error::CommandFailed {
                command: self.command,
                code: self.code,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// A process that was started but is not awaited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detached {
    pub command: String,
    pub pid: u32,
}

impl fmt::Display for Detached {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (pid {})", self.command, self.pid)
    }
}

/// Render a program and its arguments the way a user would type them.
pub fn display_command(program: &Path, args: &[&str]) -> String {
    let name = program
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| program.display().to_string());
    let mut parts = vec![name];
    parts.extend(args.iter().map(|a| shell_escape(a)));
    parts.join(" ")
}

/// Run `program args...` in `cwd`, wait for it and capture its output.
///
/// Only a failure to launch is an error here; callers decide what a non-zero
/// exit means (see [`CommandOutput::check`]).
pub fn run(program: &Path, args: &[&str], cwd: &Path) -> Result<CommandOutput> {
    let command = display_command(program, args);
    mlog_debug!("run: {} (cwd={})", command, cwd.display());
    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .output()?;

    let result = CommandOutput {
        command,
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    };
    mlog_debug!("exit: {} -> {:?}", result.command, result.code);
    mlog_trace!("stdout: {}", result.stdout);
    mlog_trace!("stderr: {}", result.stderr);
    Ok(result)
}

/// Start `program args...` in `cwd` and return without waiting for it.
pub fn spawn_detached(program: &Path, args: &[&str], cwd: &Path) -> Result<Detached> {
    let command = display_command(program, args);
    mlog_debug!("spawn: {} (cwd={})", command, cwd.display());
    let child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(Detached {
        command,
        pid: child.id(),
    })
}

/// Run a shell command line with inherited stdio and wait for it.
pub fn run_shell(command_line: &str, cwd: &Path) -> Result<Option<i32>> {
    mlog_debug!("shell: {} (cwd={})", command_line, cwd.display());
    let status = Command::new("sh")
        .arg("-c")
        .arg(command_line)
        .current_dir(cwd)
        .status()?;
    Ok(status.code())
}

fn shell_escape(s: &str) -> String {
    if !s.is_empty()
        && s.chars().all(|c| {
            c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':' | '=' | '@')
        })
    {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', "'\"'\"'"))
    }
}
