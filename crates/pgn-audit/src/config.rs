//! Configuration file loading for the PGN auditor.
//!
//! Settings come from `audit.toml` in the working directory (or a file given
//! with `--config`); command line flags override them.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading configuration or resolving inputs.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// An input pattern is not a valid glob.
    #[error("Invalid input pattern {pattern}: {source}")]
    PatternError {
        pattern: String,
        source: glob::PatternError,
    },
}

/// Auditor configuration.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct AuditConfig {
    /// Number of worker threads. Defaults to the available parallelism.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Glob patterns of PGN files to audit.
    #[serde(default)]
    pub inputs: Vec<String>,
    /// Whether every game starts from the initial position. Defaults to true.
    #[serde(default = "default_reset_between_games")]
    pub reset_between_games: bool,
    /// Where to write the JSON report, if anywhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<PathBuf>,
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn default_reset_between_games() -> bool {
    true
}

impl Default for AuditConfig {
    fn default() -> Self {
        AuditConfig {
            workers: default_workers(),
            inputs: Vec::new(),
            reset_between_games: default_reset_between_games(),
            report: None,
        }
    }
}

impl AuditConfig {
    /// Loads the configuration from [`Self::config_path()`], or returns the
    /// defaults if that file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
    /// or [`ConfigError::ParseError`] if the file contains invalid TOML.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads the configuration from `path`, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Returns the path to the default configuration file.
    pub fn config_path() -> PathBuf {
        PathBuf::from("audit.toml")
    }

    /// Expands the input patterns into a sorted, de-duplicated file list.
    ///
    /// Patterns that match nothing are logged and skipped.
    pub fn resolve_inputs(&self) -> Result<Vec<PathBuf>, ConfigError> {
        let mut files = Vec::new();
        for pattern in &self.inputs {
            let paths = glob::glob(pattern).map_err(|source| ConfigError::PatternError {
                pattern: pattern.clone(),
                source,
            })?;
            let before = files.len();
            for entry in paths {
                match entry {
                    Ok(path) if path.is_file() => files.push(path),
                    Ok(_) => {}
                    Err(e) => tracing::warn!("Cannot read {:?}: {}", e.path(), e.error()),
                }
            }
            if files.len() == before {
                tracing::warn!("Input pattern {} matched no files", pattern);
            }
        }
        files.sort();
        files.dedup();
        Ok(files)
    }
}
