//! Migration service: task store, engine and persistence
//!
//! The task store sits behind a `std::sync::Mutex` that is only held for
//! short synchronous steps, never across an `.await`.

use mcpx_scanner::{LogEvent, Logger, McpCollection, NoopLogger};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::engine::{MigrationEngine, MigrationProgress, MigrationProgressFn, MigrationResult};
use super::error::MigrationError;
use super::store::{Outcome, TaskStore};
use super::task::{MigrationTask, TaskStatus};
use crate::storage::{keys, KeyedStore, KeyedStoreExt};

const SOURCE: &str = "migration-service";

/// Aggregate numbers over active and finished tasks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationStats {
    pub total_tasks: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub total_items: usize,
    /// Items of completed tasks that did not fail
    pub successful_items: usize,
    /// `successful_items / total_items * 100`; 0 without items
    pub success_rate: f64,
}

/// Creates, runs, cancels and retries migration tasks
pub struct MigrationService {
    engine: MigrationEngine,
    tasks: Mutex<TaskStore>,
    store: Option<Arc<dyn KeyedStore>>,
    logger: Arc<dyn Logger>,
}

impl MigrationService {
    /// Service without persistence
    pub fn new(engine: MigrationEngine) -> Self {
        Self {
            engine,
            tasks: Mutex::new(TaskStore::new()),
            store: None,
            logger: Arc::new(NoopLogger),
        }
    }

    /// Service persisting tasks in `store`, loading what is already there
    pub fn with_store(engine: MigrationEngine, store: Arc<dyn KeyedStore>) -> Result<Self, MigrationError> {
        let active: Vec<MigrationTask> = store.read_json(keys::ACTIVE_MIGRATION_TASKS)?.unwrap_or_default();
        let history: Vec<MigrationTask> = store.read_json(keys::MIGRATION_HISTORY)?.unwrap_or_default();
        let service = Self {
            engine,
            tasks: Mutex::new(TaskStore::restore(active, history)),
            store: Some(store),
            logger: Arc::new(NoopLogger),
        };
        service.persist()?;
        Ok(service)
    }

    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    fn lock(&self) -> MutexGuard<'_, TaskStore> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self) -> Result<(), MigrationError> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let (active, history) = {
            let tasks = self.lock();
            (tasks.active().to_vec(), tasks.history().to_vec())
        };
        store.write_json(keys::ACTIVE_MIGRATION_TASKS, &active)?;
        store.write_json(keys::MIGRATION_HISTORY, &history)?;
        Ok(())
    }

    /// Register a pending task
    pub fn create_task(
        &self,
        source_tool: &str,
        target_tool: &str,
        items: Vec<McpCollection>,
    ) -> Result<MigrationTask, MigrationError> {
        self.insert(MigrationTask::new(source_tool, target_tool, items))
    }

    fn insert(&self, task: MigrationTask) -> Result<MigrationTask, MigrationError> {
        self.lock().insert(task.clone());
        if let Err(e) = self.persist() {
            self.lock().discard(&task.id);
            return Err(e);
        }
        self.logger.log(LogEvent::debug(
            SOURCE,
            format!("Created task {} ({} -> {})", task.id, task.source_tool, task.target_tool),
        ));
        Ok(task)
    }

    /// Run a pending task to a terminal state
    ///
    /// A rejected run fails the task. A finished run completes it, with the
    /// ids of failed items kept for [`retry_task`](Self::retry_task).
    ///
    /// If the started task cannot be saved, it is failed with the storage
    /// message before the error is returned, so it never stays in progress.
    /// A save error after the run is returned as well; the task has already
    /// reached its terminal state by then.
    pub async fn execute_task(
        &self,
        id: &str,
        progress: Option<MigrationProgressFn<'_>>,
    ) -> Result<MigrationResult, MigrationError> {
        let (task, cancel) = self.lock().start(id)?;
        if let Err(e) = self.persist() {
            self.abandon(id, &e);
            return Err(e);
        }

        let track = |p: MigrationProgress| {
            self.lock().set_progress(&p.task_id, p.progress);
            if let Some(cb) = progress {
                cb(p);
            }
        };

        let result = self
            .engine
            .run(
                &task.id,
                &task.source_tool,
                &task.target_tool,
                &task.items,
                Some(&track),
                Some(&*cancel),
            )
            .await;

        if !result.cancelled {
            let outcome = if result.is_rejected() {
                Outcome::Failed {
                    error: result
                        .errors
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join("; "),
                }
            } else {
                Outcome::Completed {
                    failed_ids: result.failed_ids.clone(),
                }
            };
            self.lock().finish(id, outcome)?;
        }
        if let Err(e) = self.persist() {
            self.logger
                .log(LogEvent::error(SOURCE, format!("Task {id} finished but could not be saved: {e}")));
            return Err(e);
        }
        Ok(result)
    }

    /// Fail a started task whose state could not be saved
    fn abandon(&self, id: &str, cause: &MigrationError) {
        let error = format!("Could not save task state: {cause}");
        if let Err(e) = self.lock().finish(id, Outcome::Failed { error }) {
            self.logger
                .log(LogEvent::error(SOURCE, format!("Could not fail task {id}: {e}")));
        }
        if let Err(e) = self.persist() {
            self.logger
                .log(LogEvent::error(SOURCE, format!("Task {id} failed but could not be saved: {e}")));
        }
    }

    /// Create and run a task in one step
    pub async fn migrate(
        &self,
        source_tool: &str,
        target_tool: &str,
        items: Vec<McpCollection>,
        progress: Option<MigrationProgressFn<'_>>,
    ) -> Result<MigrationResult, MigrationError> {
        let task = self.create_task(source_tool, target_tool, items)?;
        self.execute_task(&task.id, progress).await
    }

    /// Cancel a pending or running task
    ///
    /// Returns `false` if the task already reached a terminal state.
    pub fn cancel_task(&self, id: &str) -> Result<bool, MigrationError> {
        let cancelled = {
            let mut tasks = self.lock();
            if tasks.get(id).is_none() {
                return Err(MigrationError::TaskNotFound(id.to_string()));
            }
            tasks.cancel(id)
        };
        if cancelled {
            self.persist()?;
            self.logger.log(LogEvent::info(SOURCE, format!("Cancelled task {id}")));
        }
        Ok(cancelled)
    }

    /// Re-run the failed items of a finished task as a new task
    pub async fn retry_task(
        &self,
        id: &str,
        progress: Option<MigrationProgressFn<'_>>,
    ) -> Result<MigrationResult, MigrationError> {
        let failed_ids = self
            .get_task(id)
            .ok_or_else(|| MigrationError::TaskNotFound(id.to_string()))?
            .failed_item_ids;
        self.retry_items(id, &failed_ids, progress).await
    }

    /// Re-run exactly `item_ids` of task `id` as a new derived task
    ///
    /// The original task is not modified.
    pub async fn retry_items(
        &self,
        id: &str,
        item_ids: &[String],
        progress: Option<MigrationProgressFn<'_>>,
    ) -> Result<MigrationResult, MigrationError> {
        let original = self
            .get_task(id)
            .ok_or_else(|| MigrationError::TaskNotFound(id.to_string()))?;
        if !original.status.is_terminal() {
            return Err(MigrationError::Precondition(format!(
                "Task {id} is still {}",
                original.status
            )));
        }
        let items = original.items_with_ids(item_ids);
        if items.is_empty() {
            return Err(MigrationError::Precondition(format!("Task {id} has no items to retry")));
        }

        let mut derived = MigrationTask::new(original.source_tool, original.target_tool, items);
        derived.retry_of = Some(original.id);
        let derived = self.insert(derived)?;
        self.logger.log(LogEvent::info(
            SOURCE,
            format!("Retrying {} item(s) of {id} as {}", derived.items.len(), derived.id),
        ));
        self.execute_task(&derived.id, progress).await
    }

    pub fn get_task(&self, id: &str) -> Option<MigrationTask> {
        self.lock().get(id).cloned()
    }

    pub fn active_tasks(&self) -> Vec<MigrationTask> {
        self.lock().active().to_vec()
    }

    pub fn history(&self) -> Vec<MigrationTask> {
        self.lock().history().to_vec()
    }

    /// Counts and success rate over every known task
    pub fn stats(&self) -> MigrationStats {
        let tasks = self.lock();
        let mut stats = MigrationStats::default();
        for task in tasks.active().iter().chain(tasks.history()) {
            stats.total_tasks += 1;
            stats.total_items += task.items.len();
            match task.status {
                TaskStatus::Pending => stats.pending += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                TaskStatus::Completed => {
                    stats.completed += 1;
                    stats.successful_items += task.items.len().saturating_sub(task.failed_item_ids.len());
                }
                TaskStatus::Failed => stats.failed += 1,
                TaskStatus::Cancelled => stats.cancelled += 1,
            }
        }
        if stats.total_items > 0 {
            stats.success_rate = stats.successful_items as f64 / stats.total_items as f64 * 100.0;
        }
        stats
    }

    /// Forget finished tasks; returns how many were removed
    pub fn clear_history(&self) -> Result<usize, MigrationError> {
        let removed = self.lock().clear_history();
        self.persist()?;
        Ok(removed)
    }

    /// Add finished tasks from an export; returns how many were new
    pub fn import_history(&self, tasks: Vec<MigrationTask>) -> Result<usize, MigrationError> {
        let added = self.lock().import_history(tasks);
        self.persist()?;
        Ok(added)
    }
}
