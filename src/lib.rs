pub mod cleanup;
pub mod config;
pub mod error;
pub mod git;
pub mod git_branches;
pub mod log;
pub mod process;
pub mod session;
pub mod workflow;

pub use error::{Error, Result};
pub use session::{BranchSpec, SessionState};
pub use workflow::{Review, TestHook, TestOutcome, Workflow};
