//! CLI command handlers
//!
//! Each command group has its own module. Handlers share a [`Context`]
//! built from the data directory.

pub mod collections;
pub mod migrate;
pub mod scan;
pub mod tasks;
pub mod transfer;

use anyhow::{Context as _, Result};
use mcpx_core::catalog::CollectionCatalog;
use mcpx_core::migration::{MigrationEngine, MigrationService};
use mcpx_core::settings::{data_dir, Settings};
use mcpx_core::storage::{KeyedStore, SqliteStore};
use mcpx_scanner::profile::merge_profiles;
use mcpx_scanner::{FileAccess, LocalFs, Logger, Tool, ToolProfile, TracingLogger};
use std::sync::Arc;

/// Database file inside the data directory
const DB_FILE: &str = "mcpx.db";

/// Shared state for one CLI invocation
pub struct Context {
    pub settings: Settings,
    pub store: Arc<dyn KeyedStore>,
    pub fs: Arc<dyn FileAccess>,
    pub logger: Arc<dyn Logger>,
}

impl Context {
    /// Load settings and open the database under the data directory
    pub fn open() -> Result<Self> {
        let data_dir = data_dir()?;
        let settings = Settings::load(&data_dir)?;
        let db_path = data_dir.join(DB_FILE);
        let store = SqliteStore::open(&db_path)
            .with_context(|| format!("Failed to open database at {}", db_path.display()))?;

        Ok(Self {
            settings,
            store: Arc::new(store),
            fs: Arc::new(LocalFs::new()),
            logger: Arc::new(TracingLogger),
        })
    }

    pub fn catalog(&self) -> CollectionCatalog {
        CollectionCatalog::new(self.store.clone())
    }

    /// Migration service over the persisted task lists
    pub fn service(&self) -> Result<MigrationService> {
        let engine = MigrationEngine::from_settings(&self.settings.migration).with_logger(self.logger.clone());
        Ok(MigrationService::with_store(engine, self.store.clone())?.with_logger(self.logger.clone()))
    }

    /// Saved profiles with `[[tools]]` settings applied on top
    pub fn profiles(&self) -> Result<Vec<ToolProfile>> {
        Ok(merge_profiles(self.catalog().tool_profiles()?, &self.settings.tools))
    }

    /// Profile for one tool id
    pub fn profile(&self, tool_id: &str) -> Result<ToolProfile> {
        self.profiles()?
            .into_iter()
            .find(|p| p.id == tool_id)
            .with_context(|| format!("Unknown tool: {tool_id}"))
    }
}

/// Print a value as pretty JSON
pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Canonical id for a tool name or alias; unknown ids pass through
pub fn tool_id(id: &str) -> String {
    id.parse::<Tool>()
        .map_or_else(|_| id.to_string(), |tool| tool.id().to_string())
}
