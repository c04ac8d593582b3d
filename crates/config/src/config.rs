//! Configuration files.

use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Default number of warmup worker threads.
pub const DEFAULT_WARMUP_THREADS: usize = 16;

/// Configuration for the reset tooling.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(default)]
pub struct Config {
    /// Table warmup.
    pub warmup: WarmupConfig,
    /// Snapshot archive used to refill blocks.
    pub snapshots: SnapshotsConfig,
    /// Defaults of the reset operations.
    pub reset: ResetConfig,
}

impl Config {
    /// Load a [`Config`] from a specified path.
    ///
    /// A new configuration file is created with default values if none exists.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, confy::ConfyError> {
        confy::load_path(path)
    }

    /// Save the configuration to toml file.
    pub fn save(&self, path: &Path) -> Result<(), confy::ConfyError> {
        if path.extension() != Some("toml".as_ref()) {
            return Err(confy::ConfyError::BadConfigDirectory(format!(
                "{} is not a toml file",
                path.display()
            )))
        }
        confy::store_path(path, self)
    }
}

/// Table warmup configuration.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Serialize)]
#[serde(default)]
pub struct WarmupConfig {
    /// Whether warmup runs at all.
    pub enabled: bool,
    /// Number of concurrent scanners.
    pub threads: usize,
    /// Minimum interval between two progress log lines.
    #[serde(with = "humantime_serde")]
    pub log_interval: Duration,
}

impl Default for WarmupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threads: DEFAULT_WARMUP_THREADS,
            log_interval: Duration::from_secs(20),
        }
    }
}

/// Snapshot archive configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(default)]
pub struct SnapshotsConfig {
    /// Whether blocks are refilled from the archive after a block reset.
    pub enabled: bool,
    /// Directory of the archive database.
    pub archive_path: Option<PathBuf>,
}

/// Defaults for the reset operations.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Serialize)]
#[serde(default)]
pub struct ResetConfig {
    /// Chain whose genesis is reseeded after an execution reset.
    pub chain: String,
    /// Scratch directory used by the execution reset.
    pub work_dir: PathBuf,
    /// Directory of additional `<chain>.json` genesis files.
    pub genesis_dir: Option<PathBuf>,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self { chain: "dev".to_string(), work_dir: std::env::temp_dir(), genesis_dir: None }
    }
}
