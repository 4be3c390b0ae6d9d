//! Migration task model and state machine
//!
//! ```text
//! PENDING --execute--> IN_PROGRESS --success--> COMPLETED
//!                      IN_PROGRESS --error----> FAILED
//! {PENDING, IN_PROGRESS} --cancel--> CANCELLED
//! ```
//!
//! Terminal states are final.

use chrono::{DateTime, Utc};
use mcpx_scanner::canonical::generate_id;
use mcpx_scanner::McpCollection;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::MigrationError;

/// Lifecycle state of a migration task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    /// Whether no further transitions are allowed
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Whether `self -> to` is a legal transition
    #[must_use]
    pub fn can_transition_to(self, to: TaskStatus) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::InProgress)
                | (Self::InProgress, Self::Completed | Self::Failed)
                | (Self::Pending | Self::InProgress, Self::Cancelled)
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// One migration request and its outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationTask {
    pub id: String,
    pub source_tool: String,
    pub target_tool: String,
    pub items: Vec<McpCollection>,
    pub status: TaskStatus,
    /// Percentage in `[0, 100]`
    pub progress: u8,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Ids of items that failed, for retry
    #[serde(default)]
    pub failed_item_ids: Vec<String>,
    /// Task this one retries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_of: Option<String>,
}

impl MigrationTask {
    /// Create a pending task
    pub fn new(source_tool: impl Into<String>, target_tool: impl Into<String>, items: Vec<McpCollection>) -> Self {
        Self {
            id: generate_id(),
            source_tool: source_tool.into(),
            target_tool: target_tool.into(),
            items,
            status: TaskStatus::Pending,
            progress: 0,
            created_at: Utc::now(),
            completed_at: None,
            error: None,
            failed_item_ids: Vec::new(),
            retry_of: None,
        }
    }

    /// Move to `to`, stamping `completed_at` on terminal states
    ///
    /// # Errors
    /// Returns `InvalidTransition` if the state machine forbids the move
    pub fn transition(&mut self, to: TaskStatus) -> Result<(), MigrationError> {
        if !self.status.can_transition_to(to) {
            return Err(MigrationError::InvalidTransition {
                id: self.id.clone(),
                from: self.status,
                to,
            });
        }
        self.status = to;
        if to.is_terminal() {
            self.completed_at = Some(Utc::now());
        }
        Ok(())
    }

    /// Items whose ids are in `ids`, in task order
    #[must_use]
    pub fn items_with_ids(&self, ids: &[String]) -> Vec<McpCollection> {
        self.items
            .iter()
            .filter(|item| ids.contains(&item.id))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut task = MigrationTask::new("cursor", "codex", Vec::new());
        task.transition(TaskStatus::InProgress).unwrap();
        assert!(task.completed_at.is_none());
        task.transition(TaskStatus::Completed).unwrap();
        assert!(task.completed_at.is_some());
    }

    #[test]
    fn test_terminal_states_are_final() {
        for terminal in [TaskStatus::Completed, TaskStatus::Failed, TaskStatus::Cancelled] {
            for to in [
                TaskStatus::Pending,
                TaskStatus::InProgress,
                TaskStatus::Completed,
                TaskStatus::Failed,
                TaskStatus::Cancelled,
            ] {
                assert!(!terminal.can_transition_to(to), "{terminal} -> {to}");
            }
        }
    }

    #[test]
    fn test_pending_cannot_complete_directly() {
        let mut task = MigrationTask::new("cursor", "codex", Vec::new());
        let err = task.transition(TaskStatus::Completed).unwrap_err();
        assert_eq!(err.code(), "INVALID_TRANSITION");
        assert_eq!(task.status, TaskStatus::Pending);
    }

    #[test]
    fn test_status_serializes_screaming_case() {
        assert_eq!(serde_json::to_string(&TaskStatus::InProgress).unwrap(), "\"IN_PROGRESS\"");
    }
}
