use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Need some origin/branches!")]
    NoBranches,

    #[error("Couldn't split {0} into remote and branch name")]
    InvalidBranchName(String),

    #[error("Savepoint already exists: {0}")]
    SavepointExists(String),

    #[error("No merge in progress (missing {})", .0.display())]
    NoSession(PathBuf),

    #[error("`{command}` failed ({}): {stderr}", exit_label(.code))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("git executable not found in PATH")]
    GitNotFound,

    #[error("Not a git repository: {0}")]
    NotARepository(String),

    #[error("Test command failed: {0}")]
    TestHookFailed(String),

    #[error("No home directory")]
    NoHomeDir,

    #[error("Savepoint branch '{0}' not found")]
    MissingSavepoint(String),
}

pub type Result<T> = std::result::Result<T, Error>;

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit {}", c),
        None => "killed".to_string(),
    }
}
