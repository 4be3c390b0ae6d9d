//! Error types for the MCPX scanner

use std::path::PathBuf;
use thiserror::Error;

/// Result type for scanner operations
pub type Result<T, E = ScanError> = std::result::Result<T, E>;

/// Errors that can occur while scanning or talking to the file system
#[derive(Error, Debug)]
pub enum ScanError {
    /// IO error on a specific path
    #[error("IO error for {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// Failed to parse JSON
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to parse YAML
    #[error("Failed to parse YAML: {0}")]
    Yaml(String),

    /// Content did not match any known file format
    #[error("Unrecognized file format: {0}")]
    Detection(String),

    /// Tool id is not registered
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// A scan is already running
    #[error("A scan is already in progress")]
    Busy,

    /// Home directory not found
    #[error("Home directory not found")]
    HomeNotFound,
}

impl ScanError {
    /// Build an IO error bound to the path that failed
    pub fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Get the error code for CLI/API responses
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "IO_ERROR",
            Self::Json(_) | Self::Yaml(_) => "PARSE_ERROR",
            Self::Detection(_) => "DETECTION_FAILED",
            Self::UnknownTool(_) => "UNKNOWN_TOOL",
            Self::Busy => "BUSY",
            Self::HomeNotFound => "HOME_NOT_FOUND",
        }
    }
}
