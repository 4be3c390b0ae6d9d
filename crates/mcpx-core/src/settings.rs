//! User settings
//!
//! Settings file: `<data_dir>/config.toml`, where `data_dir` is `$MCPX_HOME`
//! or `~/.mcpx`. A missing file yields defaults.

use mcpx_scanner::profile::merge_profiles;
use mcpx_scanner::{default_profiles, ConfidenceTable, ToolProfile};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding the data directory
pub const HOME_ENV: &str = "MCPX_HOME";

/// Settings file name inside the data directory
pub const SETTINGS_FILE: &str = "config.toml";

/// Settings errors
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error for {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Invalid settings in {path}: {message}")]
    Toml { path: PathBuf, message: String },

    #[error("Home directory not found")]
    HomeNotFound,
}

impl SettingsError {
    /// Get the error code for CLI/API responses
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "IO_ERROR",
            Self::Toml { .. } => "INVALID_SETTINGS",
            Self::HomeNotFound => "HOME_NOT_FOUND",
        }
    }
}

/// All user settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub migration: MigrationSettings,

    #[serde(default)]
    pub scan: ScanSettings,

    /// Extra or overriding tool profiles
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolProfile>,
}

/// Migration engine tunables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationSettings {
    /// Items per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between batches, in milliseconds
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
}

/// Scanner tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Found configs above this confidence are enabled on import
    #[serde(default = "default_enable_threshold")]
    pub enable_threshold: f64,

    #[serde(default)]
    pub confidence: ConfidenceTable,
}

fn default_batch_size() -> usize {
    10
}

fn default_batch_delay_ms() -> u64 {
    100
}

fn default_enable_threshold() -> f64 {
    0.6
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
        }
    }
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            enable_threshold: default_enable_threshold(),
            confidence: ConfidenceTable::default(),
        }
    }
}

impl Settings {
    /// Load settings from `<data_dir>/config.toml`
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn load(data_dir: &Path) -> Result<Self, SettingsError> {
        Self::load_from(&data_dir.join(SETTINGS_FILE))
    }

    /// Load settings from an explicit path
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| SettingsError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| SettingsError::Toml {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Write settings to `<data_dir>/config.toml`
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub fn save(&self, data_dir: &Path) -> Result<(), SettingsError> {
        let path = data_dir.join(SETTINGS_FILE);
        let content = toml::to_string_pretty(self).map_err(|e| SettingsError::Toml {
            path: path.clone(),
            message: e.to_string(),
        })?;
        fs::create_dir_all(data_dir).map_err(|e| SettingsError::Io {
            path: data_dir.to_path_buf(),
            message: e.to_string(),
        })?;
        fs::write(&path, content).map_err(|e| SettingsError::Io {
            path,
            message: e.to_string(),
        })
    }

    /// Built-in profiles with `[[tools]]` entries merged in
    #[must_use]
    pub fn profiles(&self) -> Vec<ToolProfile> {
        merge_profiles(default_profiles(), &self.tools)
    }
}

/// Resolve the data directory: `$MCPX_HOME`, else `~/.mcpx`
///
/// # Errors
/// Returns an error if neither is available
pub fn data_dir() -> Result<PathBuf, SettingsError> {
    if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".mcpx"))
        .ok_or(SettingsError::HomeNotFound)
}
