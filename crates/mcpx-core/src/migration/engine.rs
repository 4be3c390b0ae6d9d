//! Migration engine
//!
//! Converts canonical collections from one tool's representation to
//! another's. Each item goes through the source tool's codec and adapter
//! (round-trip normalization), is re-tagged to the target tool, goes through
//! the target's codec and adapter, and is validated. A failing item is
//! recorded and skipped; the batch keeps going.

use mcpx_scanner::busy::BusyGuard;
use mcpx_scanner::canonical::generate_id;
use mcpx_scanner::{validate_collection, Formats, LogEvent, Logger, McpCollection, NoopLogger, Tool};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::error::{FailureStage, ItemFailure, MigrationError};
use super::task::TaskStatus;
use crate::settings::MigrationSettings;

const SOURCE: &str = "migration";

/// Default number of items per batch
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Default pause between batches
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(100);

/// Progress snapshot emitted after every item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationProgress {
    pub task_id: String,
    pub current: usize,
    pub total: usize,
    /// `round(current / total * 100)`; 100 for an empty batch
    pub progress: u8,
    pub status: TaskStatus,
    pub errors: Vec<ItemFailure>,
    pub warnings: Vec<String>,
}

/// Progress callback
pub type MigrationProgressFn<'a> = &'a (dyn Fn(MigrationProgress) + Send + Sync);

/// Outcome of one migration run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationResult {
    /// Preconditions held and the run was not cancelled
    pub success: bool,
    pub task_id: String,
    pub migrated_count: usize,
    pub failed_count: usize,
    pub errors: Vec<ItemFailure>,
    pub warnings: Vec<String>,
    pub duration_ms: u64,
    /// Converted collections, owned by the target tool
    #[serde(default)]
    pub migrated: Vec<McpCollection>,
    /// Ids of items that failed
    #[serde(default)]
    pub failed_ids: Vec<String>,
    #[serde(default)]
    pub cancelled: bool,
}

impl MigrationResult {
    fn rejected(task_id: &str, total: usize, message: String, started: Instant) -> Self {
        Self {
            success: false,
            task_id: task_id.to_string(),
            migrated_count: 0,
            failed_count: total,
            errors: vec![ItemFailure::precondition(message)],
            warnings: Vec::new(),
            duration_ms: elapsed_ms(started),
            migrated: Vec::new(),
            failed_ids: Vec::new(),
            cancelled: false,
        }
    }

    /// Whether the run was rejected before any item was processed
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        self.errors.iter().any(|e| e.stage == FailureStage::Precondition)
    }
}

/// Batch converter between tools
pub struct MigrationEngine {
    logger: Arc<dyn Logger>,
    batch_size: usize,
    batch_delay: Duration,
    busy: AtomicBool,
}

impl Default for MigrationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MigrationEngine {
    /// Engine with default batch size and delay, logging nowhere
    pub fn new() -> Self {
        Self {
            logger: Arc::new(NoopLogger),
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: DEFAULT_BATCH_DELAY,
            busy: AtomicBool::new(false),
        }
    }

    /// Engine tuned from `[migration]` settings
    pub fn from_settings(settings: &MigrationSettings) -> Self {
        Self::new()
            .with_batch_size(settings.batch_size)
            .with_batch_delay(Duration::from_millis(settings.batch_delay_ms))
    }

    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Items per batch; zero is treated as one
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    #[must_use]
    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = delay;
        self
    }

    /// Migrate `items` under a fresh task id
    pub async fn migrate(
        &self,
        source_tool: &str,
        target_tool: &str,
        items: &[McpCollection],
        progress: Option<MigrationProgressFn<'_>>,
    ) -> MigrationResult {
        self.run(&generate_id(), source_tool, target_tool, items, progress, None)
            .await
    }

    /// Migrate `items` as task `task_id`
    ///
    /// `cancel` is checked before every item; once set, no further item is
    /// started and the items converted so far are returned.
    pub async fn run(
        &self,
        task_id: &str,
        source_tool: &str,
        target_tool: &str,
        items: &[McpCollection],
        progress: Option<MigrationProgressFn<'_>>,
        cancel: Option<&AtomicBool>,
    ) -> MigrationResult {
        let started = Instant::now();
        let total = items.len();

        let Some(_guard) = BusyGuard::acquire(&self.busy) else {
            return MigrationResult::rejected(
                task_id,
                total,
                MigrationError::Busy.to_string(),
                started,
            );
        };

        let (source, target) = match check_tools(source_tool, target_tool) {
            Ok(tools) => tools,
            Err(message) => {
                self.logger.log(LogEvent::warn(SOURCE, format!("Migration rejected: {message}")));
                return MigrationResult::rejected(task_id, total, message, started);
            }
        };

        self.logger.log(
            LogEvent::info(SOURCE, format!("Migrating {total} item(s) from {source} to {target}"))
                .with_data(json!({ "taskId": task_id })),
        );

        let mut migrated = Vec::new();
        let mut errors: Vec<ItemFailure> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();
        let mut current = 0;
        let mut cancelled = false;

        let emit = |current: usize, status: TaskStatus, errors: &[ItemFailure], warnings: &[String]| {
            if let Some(cb) = progress {
                cb(MigrationProgress {
                    task_id: task_id.to_string(),
                    current,
                    total,
                    progress: percent(current, total),
                    status,
                    errors: errors.to_vec(),
                    warnings: warnings.to_vec(),
                });
            }
        };

        'batches: for (index, batch) in items.chunks(self.batch_size).enumerate() {
            if index > 0 {
                self.pause().await;
            }

            for item in batch {
                if cancel.is_some_and(|flag| flag.load(Ordering::Acquire)) {
                    cancelled = true;
                    break 'batches;
                }

                match convert_item(item, source, target) {
                    Ok((collection, item_warnings)) => {
                        warnings.extend(item_warnings);
                        migrated.push(collection);
                    }
                    Err(failure) => {
                        self.logger.log(
                            LogEvent::warn(SOURCE, format!("Item failed: {failure}"))
                                .with_data(json!({ "taskId": task_id, "stage": failure.stage })),
                        );
                        errors.push(failure);
                    }
                }

                current += 1;
                emit(current, TaskStatus::InProgress, &errors, &warnings);
            }
        }

        if cancelled {
            emit(current, TaskStatus::Cancelled, &errors, &warnings);
        } else if total == 0 {
            emit(0, TaskStatus::InProgress, &errors, &warnings);
        }

        let failed_ids: Vec<String> = errors.iter().filter_map(|e| e.item_id.clone()).collect();

        self.logger.log(
            LogEvent::info(
                SOURCE,
                format!(
                    "Migration {} finished: {} migrated, {} failed{}",
                    task_id,
                    migrated.len(),
                    errors.len(),
                    if cancelled { " (cancelled)" } else { "" }
                ),
            )
            .with_data(json!({ "durationMs": elapsed_ms(started) })),
        );

        MigrationResult {
            success: !cancelled,
            task_id: task_id.to_string(),
            migrated_count: migrated.len(),
            failed_count: errors.len(),
            errors,
            warnings,
            duration_ms: elapsed_ms(started),
            migrated,
            failed_ids,
            cancelled,
        }
    }

    async fn pause(&self) {
        if self.batch_delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.batch_delay).await;
        }
    }
}

fn check_tools(source_tool: &str, target_tool: &str) -> Result<(Tool, Tool), String> {
    let source: Tool = source_tool
        .parse()
        .map_err(|_| format!("Unsupported source tool: {source_tool}"))?;
    let target: Tool = target_tool
        .parse()
        .map_err(|_| format!("Unsupported target tool: {target_tool}"))?;
    if source == target {
        return Err(format!("Source and target tool are the same: {source}"));
    }
    Ok((source, target))
}

/// Run one item through the conversion pipeline
///
/// Returns the target-owned collection and its validation warnings.
pub fn convert_item(
    item: &McpCollection,
    source: Tool,
    target: Tool,
) -> Result<(McpCollection, Vec<String>), ItemFailure> {
    let fail = |stage: FailureStage, message: String| ItemFailure::item(&item.id, stage, message);

    let source_format = source.default_format();
    let source_text = Formats::serialize(item, source_format, source).ok_or_else(|| {
        fail(
            FailureStage::SerializeSource,
            format!("Could not serialize as {source} {source_format}"),
        )
    })?;
    let mut normalized = Formats::parse(&source_text, source_format, source).ok_or_else(|| {
        fail(
            FailureStage::ParseSource,
            format!("Could not parse {source} {source_format} output"),
        )
    })?;

    normalized.source_tool = target.id().to_string();
    normalized.touch();

    let target_format = target.default_format();
    let target_text = Formats::serialize(&normalized, target_format, target).ok_or_else(|| {
        fail(
            FailureStage::SerializeTarget,
            format!("Could not serialize as {target} {target_format}"),
        )
    })?;
    let mut converted = Formats::parse(&target_text, target_format, target).ok_or_else(|| {
        fail(
            FailureStage::ParseTarget,
            format!("Could not parse {target} {target_format} output"),
        )
    })?;
    converted.enabled = item.enabled;

    let validation = validate_collection(&converted);
    if !validation.is_valid {
        return Err(fail(FailureStage::Validate, validation.errors.join("; ")));
    }

    let warnings = validation
        .warnings
        .into_iter()
        .map(|w| format!("{}: {w}", converted.metadata.name))
        .collect();
    Ok((converted, warnings))
}

fn percent(current: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = (current as f64 / total as f64 * 100.0).round();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let pct = pct.clamp(0.0, 100.0) as u8;
    pct
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
