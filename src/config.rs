use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{mlog_debug, Error, Result};

/// Environment variable that overrides `test_command`.
pub const TEST_COMMAND_ENV: &str = "MERGETRON_TEST_COMMAND";

pub const DEFAULT_SAVEPOINT: &str = "savepoint";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Name of the rollback branch created before merging.
    pub savepoint: Option<String>,
    /// Passed to `git difftool` as `--tool=<name>`.
    pub difftool: Option<String>,
    /// Shell command run by the test hook.
    pub test_command: Option<String>,
    #[serde(default)]
    pub cleanup: CleanupConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    pub enabled: bool,
    pub remote: String,
    /// Branch names never deleted. Entries are regular expressions matched
    /// against the whole name.
    pub protected: Vec<String>,
    pub gc: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            remote: "origin".to_string(),
            protected: ["master", "main", "staging", "production"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            gc: true,
        }
    }
}

impl Config {
    pub fn mergetron_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or(Error::NoHomeDir)?
            .join(".mergetron"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::mergetron_dir()?.join("mergetron.toml"))
    }

    pub fn effective_savepoint(&self) -> &str {
        self.savepoint.as_deref().unwrap_or(DEFAULT_SAVEPOINT)
    }

    /// The test command, with the environment taking precedence over the file.
    pub fn effective_test_command(&self) -> Option<String> {
        match std::env::var(TEST_COMMAND_ENV) {
            Ok(cmd) if !cmd.trim().is_empty() => Some(cmd),
            _ => self.test_command.clone(),
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Read `path`; a missing file means defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        mlog_debug!("Config::load path={}", path.display());
        if !path.exists() {
            mlog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(path)?)?;
        mlog_debug!(
            "Config loaded: savepoint={:?}, difftool={:?}, cleanup.enabled={}",
            config.savepoint,
            config.difftool,
            config.cleanup.enabled
        );
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        Self::ensure_dirs()?;
        self.save_to(&Self::config_path()?)
    }

    /// Write to `path`, creating its parent directory if needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        mlog_debug!("Config saved to {}", path.display());
        Ok(())
    }

    pub fn ensure_dirs() -> Result<()> {
        let dir = Self::mergetron_dir()?;
        if !dir.exists() {
            mlog_debug!("Creating mergetron directory: {}", dir.display());
            fs::create_dir_all(&dir)?;
        }
        Ok(())
    }
}
