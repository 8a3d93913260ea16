//! Configuration file loading for the command-line tool.
//!
//! Settings come from an optional `chess-rules.toml`; when it is absent every
//! key takes its default. A file named with `--config` must exist.

use chess_rules::FenFields;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Settings for the `chess-rules` command.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Position used when no `--fen` is given.
    /// Defaults to the standard starting position.
    #[serde(default = "default_start_fen")]
    pub start_fen: String,
    /// Depth for `perft` when none is given on the command line. Defaults to 3.
    #[serde(default = "default_perft_depth")]
    pub perft_depth: u32,
    /// Log filter used when `RUST_LOG` is not set. Defaults to "info".
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Print JSON instead of text.
    #[serde(default)]
    pub json: bool,
}

fn default_start_fen() -> String {
    FenFields::STARTPOS.to_string()
}

fn default_perft_depth() -> u32 {
    3
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            start_fen: default_start_fen(),
            perft_depth: default_perft_depth(),
            log_filter: default_log_filter(),
            json: false,
        }
    }
}

impl Config {
    /// Loads the configuration from `path`, or from [`Self::config_path()`]
    /// when no path is given.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if an explicit `path` is missing or
    /// any file cannot be read, or [`ConfigError::ParseError`] if it is not
    /// valid TOML or has unknown keys.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::read(path),
            None => {
                let default_path = Self::config_path();
                if default_path.exists() {
                    Self::read(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Returns the default configuration path, `chess-rules.toml` in the
    /// current working directory.
    pub fn config_path() -> PathBuf {
        PathBuf::from("chess-rules.toml")
    }
}
