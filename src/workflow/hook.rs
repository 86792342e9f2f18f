//! Test hook run after merging and on review.

use std::path::Path;

use crate::process;
use crate::{mlog, mlog_warn, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestOutcome {
    /// No test command configured; the hook is a placeholder.
    Unimplemented,
    Passed,
}

#[derive(Debug, Clone, Default)]
pub struct TestHook {
    command: Option<String>,
}

impl TestHook {
    pub fn new(command: Option<String>) -> Self {
        Self { command }
    }

    /// Run the configured command in `cwd` with the terminal attached.
    ///
    /// With nothing configured this logs and succeeds.
    pub fn run(&self, cwd: &Path) -> Result<TestOutcome> {
        let Some(command) = self.command.as_deref() else {
            mlog_warn!("Unimplemented: no test command configured");
            return Ok(TestOutcome::Unimplemented);
        };

        mlog!("Running tests: {}", command);
        match process::run_shell(command, cwd)? {
            Some(0) => Ok(TestOutcome::Passed),
            Some(code) => Err(Error::TestHookFailed(format!("`{}` exited with {}", command, code))),
            None => Err(Error::TestHookFailed(format!("`{}` was killed", command))),
        }
    }
}
