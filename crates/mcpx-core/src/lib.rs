//! MCPX Core - Migration engine, task lifecycle, and storage
//!
//! This crate provides the collection catalog, the migration engine and
//! its task store, target file writing with backup and rollback,
//! import/export, TOML settings, and SQLite-backed keyed storage.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::too_many_lines,
    clippy::cast_precision_loss,
    clippy::needless_pass_by_value,
    clippy::manual_let_else,
    clippy::unnecessary_debug_formatting
)]

pub mod apply;
pub mod backup;
pub mod catalog;
pub mod export;
pub mod migration;
pub mod settings;
pub mod storage;

pub use mcpx_scanner;

pub use apply::{TargetWriter, WriteReport};
pub use backup::{Backup, BackupLog};
pub use catalog::{CollectionCatalog, ConfirmReport, Selection};
pub use migration::{MigrationEngine, MigrationError, MigrationResult, MigrationService, MigrationTask, TaskStatus};
pub use settings::Settings;
pub use storage::{KeyedStore, MemoryStore, SqliteStore, StorageError};
