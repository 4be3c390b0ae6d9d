//! Migration error types

use mcpx_scanner::ScanError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::task::TaskStatus;
use crate::storage::StorageError;

/// Errors that abort a migration operation as a whole
#[derive(Error, Debug)]
pub enum MigrationError {
    /// Invalid request; nothing was attempted
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Another migration is running
    #[error("A migration is already in progress")]
    Busy,

    #[error("Migration task not found: {0}")]
    TaskNotFound(String),

    #[error("Task {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: TaskStatus,
        to: TaskStatus,
    },

    /// A one-off conversion failed at some pipeline stage
    #[error("Conversion failed: {0}")]
    Conversion(ItemFailure),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Io(#[from] ScanError),
}

impl MigrationError {
    /// Get the error code for CLI/API responses
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Precondition(_) => "PRECONDITION_FAILED",
            Self::Busy => "BUSY",
            Self::TaskNotFound(_) => "TASK_NOT_FOUND",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::Conversion(_) => "CONVERSION_FAILED",
            Self::Storage(e) => e.code(),
            Self::Io(e) => e.code(),
        }
    }
}

/// Pipeline stage at which an item failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// Request rejected before any item was processed
    Precondition,
    SerializeSource,
    ParseSource,
    SerializeTarget,
    ParseTarget,
    Validate,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Precondition => "precondition",
            Self::SerializeSource => "serialize_source",
            Self::ParseSource => "parse_source",
            Self::SerializeTarget => "serialize_target",
            Self::ParseTarget => "parse_target",
            Self::Validate => "validate",
        };
        f.write_str(s)
    }
}

/// A per-item failure, accumulated rather than raised
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFailure {
    /// Collection id; `None` for request-level failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    pub stage: FailureStage,
    pub message: String,
}

impl ItemFailure {
    pub fn item(item_id: &str, stage: FailureStage, message: impl Into<String>) -> Self {
        Self {
            item_id: Some(item_id.to_string()),
            stage,
            message: message.into(),
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self {
            item_id: None,
            stage: FailureStage::Precondition,
            message: message.into(),
        }
    }
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.item_id {
            Some(id) => write!(f, "{} ({id}) at {}", self.message, self.stage),
            None => f.write_str(&self.message),
        }
    }
}
