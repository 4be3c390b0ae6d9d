//! Active-task and history bookkeeping
//!
//! A task lives in `active` until it reaches a terminal state, then moves
//! to the append-only `history` in the same `&mut self` call. No method
//! leaves a task in both lists or in neither.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::error::MigrationError;
use super::task::{MigrationTask, TaskStatus};

/// Message recorded on tasks found running after a restart
pub const INTERRUPTED: &str = "Interrupted before completion";

/// How a run ended, as seen by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Run finished; `failed_ids` may be non-empty
    Completed { failed_ids: Vec<String> },
    /// Run was rejected or aborted
    Failed { error: String },
}

/// Active and finished migration tasks
#[derive(Debug, Default)]
pub struct TaskStore {
    active: Vec<MigrationTask>,
    history: Vec<MigrationTask>,
    cancel_flags: HashMap<String, Arc<AtomicBool>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted lists
    ///
    /// Tasks that were running when the lists were saved have no engine
    /// behind them anymore; they are failed and moved to history.
    pub fn restore(active: Vec<MigrationTask>, history: Vec<MigrationTask>) -> Self {
        let mut store = Self {
            active: Vec::new(),
            history,
            cancel_flags: HashMap::new(),
        };
        for mut task in active {
            if task.status.is_terminal() {
                store.history.push(task);
            } else if task.status == TaskStatus::InProgress {
                task.error = Some(INTERRUPTED.to_string());
                let _ = task.transition(TaskStatus::Failed);
                store.history.push(task);
            } else {
                store.insert(task);
            }
        }
        store
    }

    /// Register a new task
    pub fn insert(&mut self, task: MigrationTask) {
        self.cancel_flags
            .insert(task.id.clone(), Arc::new(AtomicBool::new(false)));
        self.active.push(task);
    }

    /// Look up a task, active first
    pub fn get(&self, id: &str) -> Option<&MigrationTask> {
        self.active
            .iter()
            .chain(self.history.iter())
            .find(|t| t.id == id)
    }

    pub fn active(&self) -> &[MigrationTask] {
        &self.active
    }

    pub fn history(&self) -> &[MigrationTask] {
        &self.history
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active.iter().any(|t| t.id == id)
    }

    /// Move a pending task to `IN_PROGRESS`
    ///
    /// Returns a snapshot of the task and its cancel flag.
    pub fn start(&mut self, id: &str) -> Result<(MigrationTask, Arc<AtomicBool>), MigrationError> {
        let task = self.active_mut(id)?;
        task.transition(TaskStatus::InProgress)?;
        let snapshot = task.clone();
        let flag = self
            .cancel_flags
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(AtomicBool::new(false)))
            .clone();
        Ok((snapshot, flag))
    }

    /// Record progress of a running task; never moves backwards
    pub fn set_progress(&mut self, id: &str, progress: u8) {
        if let Some(task) = self.active.iter_mut().find(|t| t.id == id) {
            task.progress = task.progress.max(progress.min(100));
        }
    }

    /// Apply a run's outcome and retire the task
    ///
    /// Returns `false` when the task is no longer active, e.g. because it
    /// was cancelled while the run was finishing. History is left as is.
    pub fn finish(&mut self, id: &str, outcome: Outcome) -> Result<bool, MigrationError> {
        let Some(index) = self.active.iter().position(|t| t.id == id) else {
            return Ok(false);
        };
        let task = &mut self.active[index];
        match outcome {
            Outcome::Completed { failed_ids } => {
                task.transition(TaskStatus::Completed)?;
                task.progress = 100;
                task.failed_item_ids = failed_ids;
            }
            Outcome::Failed { error } => {
                task.transition(TaskStatus::Failed)?;
                task.error = Some(error);
            }
        }
        self.retire(index);
        Ok(true)
    }

    /// Cancel a pending or running task
    ///
    /// Returns `false` if the task is unknown or already terminal.
    pub fn cancel(&mut self, id: &str) -> bool {
        let Some(index) = self.active.iter().position(|t| t.id == id) else {
            return false;
        };
        if self.active[index].transition(TaskStatus::Cancelled).is_err() {
            return false;
        }
        if let Some(flag) = self.cancel_flags.get(id) {
            flag.store(true, Ordering::Release);
        }
        self.retire(index);
        true
    }

    /// Remove an active task without recording it in history
    pub fn discard(&mut self, id: &str) -> Option<MigrationTask> {
        let index = self.active.iter().position(|t| t.id == id)?;
        self.cancel_flags.remove(id);
        Some(self.active.remove(index))
    }

    /// Drop every finished task; returns how many were removed
    pub fn clear_history(&mut self) -> usize {
        let count = self.history.len();
        self.history.clear();
        count
    }

    /// Append finished tasks whose ids are not known yet
    pub fn import_history(&mut self, tasks: Vec<MigrationTask>) -> usize {
        let mut added = 0;
        for task in tasks {
            if task.status.is_terminal() && self.get(&task.id).is_none() {
                self.history.push(task);
                added += 1;
            }
        }
        added
    }

    fn active_mut(&mut self, id: &str) -> Result<&mut MigrationTask, MigrationError> {
        if let Some(index) = self.active.iter().position(|t| t.id == id) {
            return Ok(&mut self.active[index]);
        }
        match self.history.iter().find(|t| t.id == id) {
            Some(task) => Err(MigrationError::InvalidTransition {
                id: id.to_string(),
                from: task.status,
                to: TaskStatus::InProgress,
            }),
            None => Err(MigrationError::TaskNotFound(id.to_string())),
        }
    }

    fn retire(&mut self, index: usize) {
        let task = self.active.remove(index);
        self.cancel_flags.remove(&task.id);
        self.history.push(task);
    }
}
