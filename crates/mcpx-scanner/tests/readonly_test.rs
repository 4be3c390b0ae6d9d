//! Non-destructive guarantee tests
//!
//! These tests verify that scanning NEVER modifies any files.

use mcpx_scanner::{LocalFs, LocalToolScanner, ToolProfile};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use walkdir::WalkDir;

/// Compute SHA256 hash of a file
fn hash_file(path: &Path) -> Option<String> {
    let content = fs::read(path).ok()?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Some(hex::encode(hasher.finalize()))
}

/// Create a snapshot of all files in a directory
fn snapshot_directory(path: &Path) -> HashMap<String, String> {
    let mut snapshot = HashMap::new();

    for entry in WalkDir::new(path).into_iter().filter_map(Result::ok) {
        if entry.file_type().is_file() {
            let relative_path = entry
                .path()
                .strip_prefix(path)
                .unwrap()
                .to_string_lossy()
                .to_string();
            if let Some(hash) = hash_file(entry.path()) {
                snapshot.insert(relative_path, hash);
            }
        }
    }

    snapshot
}

/// Home directory with configs for several tools, including broken ones
fn create_readonly_test_fixture() -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let base = temp_dir.path();

    let files = [
        (
            ".cursor/mcp.json",
            r#"{"mcpServers":{"fs":{"command":"npx","args":["@modelcontextprotocol/server-filesystem"]}}}"#,
        ),
        (".tabnine/mcp.json", r#"{"name":"snips","snippets":[{"code":"x"}]}"#),
        (".kilo/mcp.json", "{ not json"),
        (".continue/mcp.json", "mcpServers:\n  git:\n    command: uvx\n"),
    ];
    for (relative, content) in files {
        let path = base.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    temp_dir
}

#[tokio::test]
async fn test_scan_is_readonly() {
    let fixture = create_readonly_test_fixture();
    let before = snapshot_directory(fixture.path());

    let scanner = LocalToolScanner::new(Arc::new(LocalFs::with_home(fixture.path())));
    let results = scanner.scan_all_tools(None).await.unwrap();
    assert!(results.iter().any(|r| !r.found_configs.is_empty()));

    let after = snapshot_directory(fixture.path());
    assert_eq!(before, after, "Scanner modified files!");
}

#[tokio::test]
async fn test_repeated_scans_are_stable() {
    let fixture = create_readonly_test_fixture();
    let scanner = LocalToolScanner::new(Arc::new(LocalFs::with_home(fixture.path())))
        .with_profiles(vec![ToolProfile::new("cursor", "Cursor", &["~/.cursor/mcp.json"])]);

    let first = scanner.scan_all_tools(None).await.unwrap();
    let second = scanner.scan_all_tools(None).await.unwrap();
    assert_eq!(first, second);
}
