//! # Pipeline Configuration
//!
//! Every horizon and rule threshold used by window extraction, the boundary
//! rules and the episode compiler, in one serde tree.
//!
//! ## Usage
//! ```rust
//! use setpiece_core::config::PipelineConfig;
//!
//! let config = PipelineConfig::default();
//! assert_eq!(config.window.episode_horizon, 25);
//! ```
//!
//! ## Environment Variables
//!
//! - `SP_PIPELINE_CONFIG`: path of a YAML file to load instead of the defaults

mod thresholds;

pub use thresholds::RuleThresholds;

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{EpisodeError, Result};

pub const CONFIG_PATH_ENV: &str = "SP_PIPELINE_CONFIG";

/// Event counts for the windows handed to the rule engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window used when compiling episodes
    pub episode_horizon: usize,
    /// Window used when checking a single restart ad hoc
    pub checker_horizon: usize,
    /// Untrimmed look-ahead for end-of-half detection; always extended to
    /// reach one row past the window it accompanies
    pub lookahead: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            episode_horizon: 25,
            checker_horizon: 20,
            lookahead: 10,
        }
    }
}

/// Incremental backup of compiled episodes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackupConfig {
    pub dir: PathBuf,
    /// Restarts compiled per batch; each batch is flushed to its own file
    pub flush_every: usize,
    /// Counter value of the first file written (`comp_<n>`)
    pub first_file_number: u32,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data/interim/compiled_sequences"),
            flush_every: 50_000,
            first_file_number: 1,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub window: WindowConfig,
    pub rules: RuleThresholds,
    /// Only used when the compiler is asked to back up
    pub backup: BackupConfig,
}

impl PipelineConfig {
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }

    /// Load from the file named by `SP_PIPELINE_CONFIG`, or use defaults.
    pub fn from_env_or_default() -> Result<Self> {
        match env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => {
                tracing::info!(path = %path, "loading pipeline config");
                Self::from_yaml_file(Path::new(path.trim()))
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let horizons = [
            ("window.episode_horizon", self.window.episode_horizon),
            ("window.checker_horizon", self.window.checker_horizon),
            ("window.lookahead", self.window.lookahead),
            ("backup.flush_every", self.backup.flush_every),
        ];
        for (name, value) in horizons {
            if value == 0 {
                return Err(EpisodeError::InvalidInput(format!(
                    "{} must be positive",
                    name
                )));
            }
        }
        self.rules.validate()
    }
}
