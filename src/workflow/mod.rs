//! The merge / review / complete workflow.
//!
//! Each step is a fixed sequence of git commands. State between invocations
//! is the savepoint branch plus the session record (see [`crate::session`]).

mod hook;
mod steps;

pub use hook::{TestHook, TestOutcome};
pub use steps::{Review, Workflow};
