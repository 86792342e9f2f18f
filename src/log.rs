//! File logging for mergetron.
//!
//! Log levels:
//! - ERROR: the failure that aborted a workflow step
//! - WARN: recoverable problems (cleanup of a single branch, gc)
//! - INFO: workflow milestones (merge started, session recorded, push done)
//! - DEBUG: every git invocation and its exit status
//! - TRACE: captured stdout/stderr of git invocations
//!
//! The log lives at `~/.mergetron/mergetron.log`. It is truncated when a new
//! merge starts; `review` and `complete` append to the same session's log.
//! `--debug` or `MERGETRON_DEBUG=1` enables DEBUG; `MERGETRON_DEBUG=trace`
//! also records git output.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;

use crate::config::Config;

pub const DEBUG_ENV: &str = "MERGETRON_DEBUG";

static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();
static LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => LogLevel::Error,
            1 => LogLevel::Warn,
            2 => LogLevel::Info,
            3 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

/// Level requested through `MERGETRON_DEBUG`, if any.
///
/// `1`/`true` selects DEBUG, `trace` selects TRACE (git output included).
fn level_from_env(value: Option<&str>) -> Option<LogLevel> {
    match value?.trim().to_lowercase().as_str() {
        "1" | "true" | "debug" => Some(LogLevel::Debug),
        "trace" => Some(LogLevel::Trace),
        _ => None,
    }
}

/// Initialize logging; `--debug` raises the level to at least DEBUG.
///
/// With `fresh` the existing log file is emptied first.
pub fn init_with_debug(debug: bool, fresh: bool) {
    let env = std::env::var(DEBUG_ENV).ok();
    let mut level = level_from_env(env.as_deref()).unwrap_or(LogLevel::Info);
    if debug {
        level = level.max(LogLevel::Debug);
    }
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);

    if Config::ensure_dirs().is_err() {
        return;
    }
    if let Ok(dir) = Config::mergetron_dir() {
        let path = dir.join("mergetron.log");
        if prepare_log_file(&path, fresh).is_ok() {
            LOG_PATH.set(path).ok();
        }
    }
}

fn prepare_log_file(path: &Path, fresh: bool) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.create(true);
    if fresh {
        options.write(true).truncate(true);
    } else {
        options.append(true);
    }
    options.open(path).map(|_| ())
}

pub fn get_level() -> LogLevel {
    LogLevel::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

/// Append one line to the log file if `level` passes the filter.
pub fn log_at(level: LogLevel, msg: &str) {
    if level > get_level() {
        return;
    }
    let Some(path) = LOG_PATH.get() else {
        return;
    };
    if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let _ = writeln!(file, "{} {:<5} {}", timestamp, level.as_str(), msg);
    }
}

pub fn error(msg: &str) {
    log_at(LogLevel::Error, msg);
}

pub fn warn(msg: &str) {
    log_at(LogLevel::Warn, msg);
}

pub fn info(msg: &str) {
    log_at(LogLevel::Info, msg);
}

pub fn debug(msg: &str) {
    log_at(LogLevel::Debug, msg);
}

pub fn trace(msg: &str) {
    log_at(LogLevel::Trace, msg);
}

/// Log macro for INFO level.
#[macro_export]
macro_rules! mlog {
    ($($arg:tt)*) => {
        $crate::log::info(&format!($($arg)*))
    };
}

/// Log macro for ERROR level.
#[macro_export]
macro_rules! mlog_error {
    ($($arg:tt)*) => {
        $crate::log::error(&format!($($arg)*))
    };
}

/// Log macro for WARN level.
#[macro_export]
macro_rules! mlog_warn {
    ($($arg:tt)*) => {
        $crate::log::warn(&format!($($arg)*))
    };
}

/// Log macro for DEBUG level (only logs when debug mode is enabled).
#[macro_export]
macro_rules! mlog_debug {
    ($($arg:tt)*) => {
        $crate::log::debug(&format!($($arg)*))
    };
}

/// Log macro for TRACE level.
#[macro_export]
macro_rules! mlog_trace {
    ($($arg:tt)*) => {
        $crate::log::trace(&format!($($arg)*))
    };
}
