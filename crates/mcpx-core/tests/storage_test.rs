//! SQLite persistence tests

use mcpx_core::catalog::CollectionCatalog;
use mcpx_core::migration::{MigrationEngine, MigrationService, TaskStatus};
use mcpx_core::storage::{KeyedStore, SqliteStore};
use mcpx_scanner::{CodeSnippet, Metadata};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn open(dir: &TempDir) -> Arc<dyn KeyedStore> {
    Arc::new(SqliteStore::open(&dir.path().join("mcpx.db")).expect("Failed to open store"))
}

#[test]
fn test_catalog_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let id = {
        let catalog = CollectionCatalog::new(open(&dir));
        let c = catalog.create("cursor", Metadata::named("fs")).unwrap();
        catalog.add_snippet(&c.id, CodeSnippet::new("{}", "json")).unwrap();
        c.id
    };

    let catalog = CollectionCatalog::new(open(&dir));
    let c = catalog.get(&id).unwrap().unwrap();
    assert_eq!(c.metadata.name, "fs");
    assert_eq!(c.code_snippets.len(), 1);
}

#[tokio::test]
async fn test_history_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let engine = || MigrationEngine::new().with_batch_delay(Duration::ZERO);

    let task_id = {
        let service = MigrationService::with_store(engine(), open(&dir)).unwrap();
        let mut item = mcpx_scanner::McpCollection::new("cursor", Metadata::named("fs"));
        item.add_snippet(CodeSnippet::new("{}", "json"));
        service.migrate("cursor", "codex", vec![item], None).await.unwrap().task_id
    };

    let service = MigrationService::with_store(engine(), open(&dir)).unwrap();
    let task = service.get_task(&task_id).unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
    assert!(service.active_tasks().is_empty());
    assert_eq!(service.stats().completed, 1);
}
