//! Migration between tools
//!
//! - [`engine`]: per-item conversion pipeline, batching, progress, cancellation
//! - [`task`]: task model and state machine
//! - [`store`]: active/history bookkeeping
//! - [`service`]: the above plus persistence and retry
//! - [`convert`]: single-file conversion

pub mod convert;
pub mod engine;
pub mod error;
pub mod service;
pub mod store;
pub mod task;

pub use convert::convert;
pub use engine::{convert_item, MigrationEngine, MigrationProgress, MigrationProgressFn, MigrationResult};
pub use error::{FailureStage, ItemFailure, MigrationError};
pub use service::{MigrationService, MigrationStats};
pub use store::TaskStore;
pub use task::{MigrationTask, TaskStatus};
