//! CLI integration tests using assert_cmd
//!
//! These tests verify the CLI commands work correctly end-to-end.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CURSOR_MCP: &str = r#"{
  "mcpServers": {
    "filesystem": {
      "command": "npx",
      "args": ["-y", "@modelcontextprotocol/server-filesystem", "/tmp"]
    }
  }
}"#;

/// Get a command instance for the mcpx binary with an isolated home
fn mcpx_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("mcpx").expect("Failed to find mcpx binary");
    cmd.env("HOME", home)
        .env("MCPX_HOME", home.join(".mcpx"))
        .env_remove("MCPX_LOG");
    cmd
}

/// Home directory with a Cursor MCP config
fn home_with_cursor() -> TempDir {
    let home = TempDir::new().expect("Failed to create temp directory");
    let cursor_dir = home.path().join(".cursor");
    fs::create_dir_all(&cursor_dir).expect("Failed to create .cursor");
    fs::write(cursor_dir.join("mcp.json"), CURSOR_MCP).expect("Failed to write mcp.json");
    home
}

#[test]
fn test_help_command() {
    let home = TempDir::new().unwrap();
    mcpx_cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("MCP configuration migration"));
}

#[test]
fn test_version_command() {
    let home = TempDir::new().unwrap();
    mcpx_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mcpx"));
}

#[test]
fn test_list_empty() {
    let home = TempDir::new().unwrap();
    mcpx_cmd(home.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No collections found."));
}

#[test]
fn test_scan_summary() {
    let home = home_with_cursor();
    mcpx_cmd(home.path())
        .arg("scan")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cursor [ok]: 1 config(s)"))
        .stdout(predicate::str::contains("filesystem (90%)"));
}

#[test]
fn test_scan_json_report() {
    let home = home_with_cursor();
    mcpx_cmd(home.path())
        .args(["scan", "--tool", "cursor", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"toolId\": \"cursor\""))
        .stdout(predicate::str::contains("\"confidence\": 0.9"));
}

#[test]
fn test_scan_unknown_tool() {
    let home = TempDir::new().unwrap();
    mcpx_cmd(home.path())
        .args(["scan", "--tool", "notepad"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_scan_save_skips_duplicates_on_rescan() {
    let home = home_with_cursor();
    mcpx_cmd(home.path())
        .args(["scan", "--save"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Saved 1 collection(s), skipped 0 duplicate(s)."));

    mcpx_cmd(home.path())
        .args(["scan", "--save"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Saved 0 collection(s), skipped 1 duplicate(s)."));

    mcpx_cmd(home.path())
        .args(["list", "--tool", "cursor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("filesystem [cursor]"));
}

#[test]
fn test_migrate_and_write() {
    let home = home_with_cursor();
    mcpx_cmd(home.path()).args(["scan", "--save"]).assert().success();

    mcpx_cmd(home.path())
        .args(["migrate", "--from", "cursor", "--to", "codex", "--write"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 migrated, 0 failed"));

    let written = home.path().join(".codex").join("mcp.json");
    let content = fs::read_to_string(&written).expect("target file written");
    assert!(content.contains("\"code_snippets\""));
    assert!(content.contains("filesystem"));

    mcpx_cmd(home.path())
        .args(["list", "--tool", "codex"])
        .assert()
        .success()
        .stdout(predicate::str::contains("filesystem [codex]"));

    mcpx_cmd(home.path())
        .args(["tasks", "list", "--history"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cursor -> codex [COMPLETED]"));

    mcpx_cmd(home.path())
        .args(["tasks", "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tasks: 1"));
}

#[test]
fn test_migrate_write_merges_and_rolls_back() {
    let home = home_with_cursor();
    let codex_dir = home.path().join(".codex");
    fs::create_dir_all(&codex_dir).unwrap();
    fs::write(
        codex_dir.join("mcp.json"),
        r#"{"mcpServers":{"git":{"command":"uvx","args":["mcp-server-git"]}}}"#,
    )
    .unwrap();
    mcpx_cmd(home.path()).args(["scan", "--save"]).assert().success();

    let output = mcpx_cmd(home.path())
        .args(["migrate", "--from", "codex", "--to", "cursor", "--write"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup "))
        .get_output()
        .stdout
        .clone();

    let cursor_file = home.path().join(".cursor").join("mcp.json");
    let merged: serde_json::Value = serde_json::from_str(&fs::read_to_string(&cursor_file).unwrap()).unwrap();
    assert_eq!(merged["mcpServers"]["filesystem"]["command"], "npx");
    assert_eq!(merged["mcpServers"]["git"]["command"], "uvx");

    let stdout = String::from_utf8(output).unwrap();
    let backup_id = stdout
        .lines()
        .find_map(|line| line.strip_prefix("Backup "))
        .and_then(|rest| rest.split_whitespace().next())
        .expect("backup id printed")
        .to_string();

    mcpx_cmd(home.path())
        .args(["rollback", &backup_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored 1 file(s)"));
    assert_eq!(fs::read_to_string(&cursor_file).unwrap(), CURSOR_MCP);

    mcpx_cmd(home.path())
        .args(["rollback", &backup_id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Backup not found"));
}

#[test]
fn test_migrate_same_tool_fails() {
    let home = home_with_cursor();
    mcpx_cmd(home.path()).args(["scan", "--save"]).assert().success();

    mcpx_cmd(home.path())
        .args(["migrate", "--from", "cursor", "--to", "cursor"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Source and target tool are the same"));

    mcpx_cmd(home.path())
        .args(["tasks", "list", "--history"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[FAILED]"));
}

#[test]
fn test_migrate_without_collections_fails() {
    let home = TempDir::new().unwrap();
    mcpx_cmd(home.path())
        .args(["migrate", "--from", "cursor", "--to", "codex"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No collections to migrate"));
}

#[test]
fn test_retry_unknown_task() {
    let home = TempDir::new().unwrap();
    mcpx_cmd(home.path())
        .args(["retry", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Migration task not found: nope"));
}

#[test]
fn test_convert_to_yaml() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("rules.json");
    fs::write(
        &input,
        r#"{"name": "rules", "code": [{"content": "SELECT 1", "language": "sql"}]}"#,
    )
    .unwrap();

    mcpx_cmd(home.path())
        .arg("convert")
        .arg(&input)
        .args(["--from", "cursor", "--to", "kilocode", "--format", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("snippets:"))
        .stdout(predicate::str::contains("lang: sql"));
}

#[test]
fn test_convert_unknown_tool() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("rules.json");
    fs::write(&input, "{}").unwrap();

    mcpx_cmd(home.path())
        .arg("convert")
        .arg(&input)
        .args(["--from", "cursor", "--to", "notepad"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown tool: notepad"));
}

#[test]
fn test_export_then_import_into_fresh_home() {
    let source = home_with_cursor();
    mcpx_cmd(source.path()).args(["scan", "--save"]).assert().success();

    let bundle = source.path().join("bundle.json");
    mcpx_cmd(source.path())
        .arg("export")
        .arg("--output")
        .arg(&bundle)
        .assert()
        .success();

    let target = TempDir::new().unwrap();
    mcpx_cmd(target.path())
        .arg("import")
        .arg(&bundle)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 1 collection(s)"));

    mcpx_cmd(target.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("filesystem"));
}

#[test]
fn test_tasks_history_export_import() {
    let home = home_with_cursor();
    mcpx_cmd(home.path()).args(["scan", "--save"]).assert().success();
    mcpx_cmd(home.path())
        .args(["migrate", "--from", "cursor", "--to", "tabnine"])
        .assert()
        .success();

    let history = home.path().join("history.json");
    mcpx_cmd(home.path())
        .args(["tasks", "export", "--output"])
        .arg(&history)
        .assert()
        .success();

    mcpx_cmd(home.path())
        .args(["tasks", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 task(s)"));

    mcpx_cmd(home.path())
        .args(["tasks", "import"])
        .arg(&history)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 1 task(s)."));
}
