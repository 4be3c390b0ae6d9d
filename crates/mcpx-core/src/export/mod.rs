//! Import and export of collections, profiles and migration history

pub mod bundle;
pub mod history;

pub use bundle::{export_all, export_tool, import_into, parse_import, ExportBundle, ImportReport, ImportedBundle, ToolExport};
pub use history::{export_history, parse_history};

use thiserror::Error;

use crate::storage::StorageError;

/// Errors during import/export
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unrecognized import shape: {0}")]
    UnrecognizedShape(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ExportError {
    /// Get the error code for CLI/API responses
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Json(_) => "PARSE_ERROR",
            Self::UnrecognizedShape(_) => "UNRECOGNIZED_SHAPE",
            Self::UnknownTool(_) => "UNKNOWN_TOOL",
            Self::Storage(e) => e.code(),
        }
    }
}
