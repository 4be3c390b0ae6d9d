//! Local tool scanner
//!
//! Walks each tool profile's candidate paths in order, reads files through
//! [`FileAccess`], and harvests candidate MCP configurations. Tools are
//! scanned one after another so progress reports stay ordered.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::adapter::Tool;
use crate::busy::BusyGuard;
use crate::error::{Result, ScanError};
use crate::events::{LogEvent, Logger, NoopLogger};
use crate::extract::{extract, ConfidenceTable};
use crate::format::{FileFormat, Formats};
use crate::fs::FileAccess;
use crate::model::{CodeSnippet, McpCollection, Metadata};
use crate::profile::{default_profiles, ToolProfile};

const SOURCE: &str = "scanner";

/// Overall outcome of scanning one tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    /// Every readable path was harvested without error
    Success,
    /// At least one path was read, but some paths failed
    Partial,
    /// Nothing could be read
    Failed,
}

/// A candidate configuration found on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundConfig {
    pub name: String,
    pub description: String,
    pub raw_config: Value,
    /// Resolved path the configuration was read from
    pub source_file: PathBuf,
    pub format: FileFormat,
    /// Heuristic certainty in `[0, 1]`
    pub confidence: f64,
}

impl FoundConfig {
    /// Build a canonical collection owned by `tool_id`
    ///
    /// A native collection in the tool's own shape is lifted through its
    /// adapter. Anything else becomes a collection whose configuration is the
    /// raw server config, also kept as a `json` snippet. The collection is
    /// enabled when `confidence > enable_threshold`.
    #[must_use]
    pub fn to_collection(&self, tool_id: &str, enable_threshold: f64) -> McpCollection {
        let native = tool_id
            .parse::<Tool>()
            .ok()
            .filter(|t| t.adapter().matches(&self.raw_config))
            .and_then(|t| t.adapter().from_native(self.raw_config.clone(), tool_id));

        let mut collection = native.unwrap_or_else(|| {
            let mut metadata = Metadata::named(self.name.clone());
            metadata.description = Some(self.description.clone());
            metadata.configuration = self.raw_config.as_object().cloned();
            let mut collection = McpCollection::new(tool_id, metadata);

            let content = serde_json::to_string_pretty(&self.raw_config).unwrap_or_else(|_| self.raw_config.to_string());
            let mut snippet = CodeSnippet::new(content, "json");
            snippet.description = Some(format!("Server configuration from {}", self.source_file.display()));
            snippet.tags.insert("mcp-server".to_string());
            collection.add_snippet(snippet);
            collection
        });
        collection.metadata.tags.insert("scanned".to_string());
        collection.enabled = self.confidence > enable_threshold;
        collection
    }
}

/// Result of scanning one tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub tool_id: String,
    pub tool_name: String,
    #[serde(default)]
    pub found_configs: Vec<FoundConfig>,
    pub status: ScanStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ScanResult {
    fn failed(profile: &ToolProfile, message: impl Into<String>) -> Self {
        Self {
            tool_id: profile.id.clone(),
            tool_name: profile.name.clone(),
            found_configs: Vec::new(),
            status: ScanStatus::Failed,
            error_message: Some(message.into()),
        }
    }

    /// Whether the scan produced usable configurations
    #[must_use]
    pub fn has_configs(&self) -> bool {
        self.status != ScanStatus::Failed && !self.found_configs.is_empty()
    }
}

/// Progress report emitted during a multi-tool scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanProgress {
    pub current: usize,
    pub total: usize,
    /// Tool that just finished, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_id: Option<String>,
    pub message: String,
}

/// Progress callback
pub type ScanProgressFn<'a> = &'a (dyn Fn(ScanProgress) + Send + Sync);

/// Scanner over a set of tool profiles
pub struct LocalToolScanner {
    profiles: Vec<ToolProfile>,
    fs: Arc<dyn FileAccess>,
    logger: Arc<dyn Logger>,
    confidence: ConfidenceTable,
    busy: AtomicBool,
}

impl LocalToolScanner {
    /// Scanner over the built-in profiles
    pub fn new(fs: Arc<dyn FileAccess>) -> Self {
        Self {
            profiles: default_profiles(),
            fs,
            logger: Arc::new(NoopLogger),
            confidence: ConfidenceTable::default(),
            busy: AtomicBool::new(false),
        }
    }

    /// Replace the profile list
    #[must_use]
    pub fn with_profiles(mut self, profiles: Vec<ToolProfile>) -> Self {
        self.profiles = profiles;
        self
    }

    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    #[must_use]
    pub fn with_confidence(mut self, confidence: ConfidenceTable) -> Self {
        self.confidence = confidence;
        self
    }

    #[must_use]
    pub fn profiles(&self) -> &[ToolProfile] {
        &self.profiles
    }

    /// Scan every profile in order
    ///
    /// # Errors
    /// Returns `Busy` if another scan on this scanner is running. Per-tool
    /// problems are reported inside each [`ScanResult`], never as errors.
    pub async fn scan_all_tools(&self, progress: Option<ScanProgressFn<'_>>) -> Result<Vec<ScanResult>> {
        let profiles: Vec<&ToolProfile> = self.profiles.iter().collect();
        self.scan_profiles(&profiles, progress).await
    }

    /// Scan only the profiles with the given ids, in the given order
    ///
    /// # Errors
    /// Returns `UnknownTool` for an id with no profile, or `Busy`.
    pub async fn scan_tools(&self, ids: &[String], progress: Option<ScanProgressFn<'_>>) -> Result<Vec<ScanResult>> {
        let profiles = ids
            .iter()
            .map(|id| {
                self.profiles
                    .iter()
                    .find(|p| &p.id == id)
                    .ok_or_else(|| ScanError::UnknownTool(id.clone()))
            })
            .collect::<Result<Vec<_>>>()?;
        self.scan_profiles(&profiles, progress).await
    }

    async fn scan_profiles(
        &self,
        profiles: &[&ToolProfile],
        progress: Option<ScanProgressFn<'_>>,
    ) -> Result<Vec<ScanResult>> {
        let _guard = BusyGuard::acquire(&self.busy).ok_or(ScanError::Busy)?;
        let total = profiles.len();
        let report = |current: usize, tool_id: Option<&str>, message: String| {
            if let Some(cb) = progress {
                cb(ScanProgress {
                    current,
                    total,
                    tool_id: tool_id.map(ToString::to_string),
                    message,
                });
            }
        };

        self.logger
            .log(LogEvent::info(SOURCE, "Starting tool scan").with_data(json!({ "tools": total })));
        report(0, None, "Starting scan".to_string());

        let mut results = Vec::with_capacity(total);
        for (index, profile) in profiles.iter().enumerate() {
            let result = self.scan_tool(profile).await;
            report(
                index + 1,
                Some(profile.id.as_str()),
                format!("Scanned {} ({} found)", profile.name, result.found_configs.len()),
            );
            results.push(result);
        }

        let found: usize = results.iter().map(|r| r.found_configs.len()).sum();
        self.logger
            .log(LogEvent::info(SOURCE, "Tool scan finished").with_data(json!({ "tools": total, "found": found })));
        report(total, None, format!("Scan complete: {found} configurations found"));
        Ok(results)
    }

    /// Scan a single profile; never fails, problems go into the result
    pub async fn scan_tool(&self, profile: &ToolProfile) -> ScanResult {
        if profile.paths.is_empty() {
            return ScanResult::failed(profile, format!("No candidate paths configured for {}", profile.name));
        }

        let mut found_configs = Vec::new();
        let mut path_errors = Vec::new();
        let mut files_read = 0usize;

        for candidate in &profile.paths {
            let path = match self.fs.resolve_home(candidate) {
                Ok(path) => path,
                Err(e) => {
                    self.log_path_error(profile, candidate, &e.to_string());
                    path_errors.push(format!("{candidate}: {e}"));
                    continue;
                }
            };

            self.logger.log(
                LogEvent::debug(SOURCE, format!("Checking {}", path.display()))
                    .with_data(json!({ "tool": profile.id })),
            );
            if !self.fs.exists(&path).await {
                continue;
            }

            let content = match self.fs.read_text(&path).await {
                Ok(content) => content,
                Err(e) => {
                    self.log_path_error(profile, candidate, &e.to_string());
                    path_errors.push(e.to_string());
                    continue;
                }
            };
            files_read += 1;

            match self.harvest(profile, &path, &content) {
                Ok(configs) => {
                    if !configs.is_empty() {
                        self.logger.log(
                            LogEvent::info(SOURCE, format!("Found {} configuration(s) in {}", configs.len(), path.display()))
                                .with_data(json!({ "tool": profile.id })),
                        );
                    }
                    found_configs.extend(configs);
                }
                Err(e) => {
                    self.log_path_error(profile, candidate, &e.to_string());
                    path_errors.push(format!("{}: {e}", path.display()));
                }
            }
        }

        let (status, error_message) = if files_read == 0 {
            let mut message = "No readable configuration file found".to_string();
            if !path_errors.is_empty() {
                message = format!("{message} ({})", path_errors.join("; "));
            }
            (ScanStatus::Failed, Some(message))
        } else if path_errors.is_empty() {
            (ScanStatus::Success, None)
        } else {
            (ScanStatus::Partial, Some(path_errors.join("; ")))
        };

        ScanResult {
            tool_id: profile.id.clone(),
            tool_name: profile.name.clone(),
            found_configs,
            status,
            error_message,
        }
    }

    fn harvest(&self, profile: &ToolProfile, path: &Path, content: &str) -> Result<Vec<FoundConfig>> {
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let detected = Formats::detect(file_name, content);
        let (format, value) = Formats::decode_lenient(detected, content)
            .map_err(|e| ScanError::Detection(format!("content is neither JSON nor YAML ({e})")))?;

        Ok(extract(&value, profile.tool(), &profile.markers, &self.confidence)
            .into_iter()
            .map(|e| FoundConfig {
                name: e.name,
                description: e.description,
                raw_config: e.raw_config,
                source_file: path.to_path_buf(),
                format,
                confidence: e.confidence,
            })
            .collect())
    }

    fn log_path_error(&self, profile: &ToolProfile, candidate: &str, message: &str) {
        self.logger.log(
            LogEvent::error(SOURCE, format!("Skipping {candidate}: {message}"))
                .with_data(json!({ "tool": profile.id })),
        );
    }
}

/// Tools that produced at least one usable configuration
#[must_use]
pub fn discovered_tools(results: &[ScanResult]) -> Vec<&ScanResult> {
    results.iter().filter(|r| r.has_configs()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{LogLevel, MemoryLogger};
    use crate::fs::MemoryFs;
    use std::sync::Mutex;

    fn profile(paths: &[&str]) -> ToolProfile {
        ToolProfile::new("cursor", "Cursor", paths)
    }

    #[tokio::test]
    async fn test_scan_wrapped_servers() {
        let fs = MemoryFs::new("/home/dev").with_file(
            "/home/dev/.cursor/mcp.json",
            r#"{"mcpServers":{"git":{"command":"uvx","args":["mcp-server-git"]}}}"#,
        );
        let scanner = LocalToolScanner::new(Arc::new(fs)).with_profiles(vec![profile(&["~/.cursor/mcp.json"])]);
        let results = scanner.scan_all_tools(None).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, ScanStatus::Success);
        assert_eq!(results[0].found_configs[0].name, "git");
        assert_eq!(results[0].found_configs[0].format, FileFormat::Json);
    }

    #[tokio::test]
    async fn test_unreadable_path_makes_partial() {
        let fs = MemoryFs::new("/h")
            .with_unreadable("/h/a.json")
            .with_file("/h/b.json", r#"{"mcpServers":{"x":{"command":"x"}}}"#);
        let logger = Arc::new(MemoryLogger::new());
        let scanner = LocalToolScanner::new(Arc::new(fs))
            .with_profiles(vec![profile(&["~/a.json", "~/b.json"])])
            .with_logger(logger.clone());

        let result = scanner.scan_tool(&scanner.profiles()[0]).await;
        assert_eq!(result.status, ScanStatus::Partial);
        assert_eq!(result.found_configs.len(), 1);
        assert!(result.error_message.is_some());
        assert_eq!(logger.count(LogLevel::Error), 1);
    }

    #[tokio::test]
    async fn test_undecodable_file_makes_partial() {
        let fs = MemoryFs::new("/h")
            .with_file("/h/a.json", "{ \"broken\": [")
            .with_file("/h/b.json", r#"{"mcpServers":{"x":{"command":"x"}}}"#);
        let scanner = LocalToolScanner::new(Arc::new(fs)).with_profiles(vec![profile(&["~/a.json", "~/b.json"])]);

        let result = scanner.scan_tool(&scanner.profiles()[0]).await;
        assert_eq!(result.status, ScanStatus::Partial);
        assert_eq!(result.found_configs.len(), 1);
    }

    #[tokio::test]
    async fn test_profile_without_paths_fails() {
        let scanner = LocalToolScanner::new(Arc::new(MemoryFs::new("/h")));
        let result = scanner.scan_tool(&profile(&[])).await;
        assert_eq!(result.status, ScanStatus::Failed);
        assert!(result.error_message.unwrap().contains("No candidate paths"));
    }

    #[tokio::test]
    async fn test_progress_sequence() {
        let fs = MemoryFs::new("/h");
        let scanner = LocalToolScanner::new(Arc::new(fs)).with_profiles(vec![
            profile(&["~/a.json"]),
            ToolProfile::new("codex", "Codex", &["~/b.json"]),
        ]);
        let seen = Mutex::new(Vec::new());
        let cb = |p: ScanProgress| seen.lock().unwrap().push((p.current, p.total));
        scanner.scan_all_tools(Some(&cb)).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![(0, 2), (1, 2), (2, 2), (2, 2)]);
    }

    #[tokio::test]
    async fn test_scan_tools_unknown_id() {
        let scanner = LocalToolScanner::new(Arc::new(MemoryFs::new("/h")));
        let err = scanner.scan_tools(&["vim".to_string()], None).await.unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_TOOL");
    }

    #[tokio::test]
    async fn test_yaml_file_is_harvested() {
        let fs = MemoryFs::new("/h").with_file(
            "/h/.continue/config.yaml",
            "mcpServers:\n  fs:\n    command: npx\n    args: [\"-y\", \"@modelcontextprotocol/server-filesystem\"]\n",
        );
        let scanner = LocalToolScanner::new(Arc::new(fs))
            .with_profiles(vec![ToolProfile::new("continue", "Continue", &["~/.continue/config.yaml"])]);
        let results = scanner.scan_all_tools(None).await.unwrap();

        let found = &results[0].found_configs[0];
        assert_eq!(found.format, FileFormat::Yaml);
        assert!((found.confidence - 0.9).abs() < f64::EPSILON);
        assert_eq!(discovered_tools(&results).len(), 1);
    }

    #[tokio::test]
    async fn test_profile_markers_drive_detection() {
        let fs = MemoryFs::new("/h").with_file(
            "/h/.config/zed/settings.json",
            r#"{"context_servers":{"fs":{"command":"npx","args":["-y","@modelcontextprotocol/server-filesystem"]}}}"#,
        );
        let plain = ToolProfile::new("zed", "Zed", &["~/.config/zed/settings.json"]);
        let mut marked = plain.clone();
        marked.markers.push("context_servers".to_string());
        let scanner = LocalToolScanner::new(Arc::new(fs));

        let without = scanner.scan_tool(&plain).await;
        assert_eq!(without.status, ScanStatus::Success);
        assert!(without.found_configs.is_empty());

        let with = scanner.scan_tool(&marked).await;
        assert_eq!(with.found_configs.len(), 1);
        assert_eq!(with.found_configs[0].name, "fs");
        assert!((with.found_configs[0].confidence - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_to_collection_enabled_by_threshold() {
        let found = FoundConfig {
            name: "fs".to_string(),
            description: "filesystem".to_string(),
            raw_config: serde_json::json!({ "command": "npx" }),
            source_file: PathBuf::from("/h/mcp.json"),
            format: FileFormat::Json,
            confidence: 0.5,
        };
        let low = found.to_collection("cursor", 0.6);
        assert!(!low.enabled);
        assert_eq!(low.metadata.name, "fs");
        assert_eq!(low.code_snippets[0].language, "json");
        assert_eq!(low.metadata.configuration.unwrap()["command"], "npx");

        let high = FoundConfig { confidence: 0.9, ..found };
        assert!(high.to_collection("cursor", 0.6).enabled);
    }

    #[test]
    fn test_to_collection_lifts_native_shape() {
        let found = FoundConfig {
            name: "rules".to_string(),
            description: String::new(),
            raw_config: serde_json::json!({ "name": "rules", "code": [{ "content": "x", "language": "sql" }] }),
            source_file: PathBuf::from("/h/mcp.json"),
            format: FileFormat::Json,
            confidence: 0.7,
        };
        let c = found.to_collection("cursor", 0.6);
        assert_eq!(c.code_snippets[0].language, "sql");
        assert!(c.enabled);
        assert!(c.metadata.tags.contains("scanned"));
    }

    /// Yields before every lookup so two scans interleave
    struct YieldingFs(MemoryFs);

    #[async_trait::async_trait]
    impl FileAccess for YieldingFs {
        async fn exists(&self, path: &Path) -> bool {
            tokio::task::yield_now().await;
            self.0.exists(path).await
        }

        async fn read_text(&self, path: &Path) -> Result<String> {
            self.0.read_text(path).await
        }

        async fn write_text(&self, path: &Path, content: &str) -> Result<()> {
            self.0.write_text(path, content).await
        }

        async fn remove_file(&self, path: &Path) -> Result<()> {
            self.0.remove_file(path).await
        }

        fn home_dir(&self) -> Result<PathBuf> {
            self.0.home_dir()
        }
    }

    #[tokio::test]
    async fn test_overlapping_scan_is_busy() {
        let fs = YieldingFs(MemoryFs::new("/h").with_file("/h/a.json", r#"{"mcpServers":{"x":{"command":"x"}}}"#));
        let scanner = LocalToolScanner::new(Arc::new(fs)).with_profiles(vec![profile(&["~/a.json"])]);
        let seen = Mutex::new(0usize);
        let cb = |_: ScanProgress| *seen.lock().unwrap() += 1;

        let (first, second) = tokio::join!(scanner.scan_all_tools(None), scanner.scan_all_tools(Some(&cb)));

        assert_eq!(first.unwrap()[0].found_configs.len(), 1);
        assert_eq!(second.unwrap_err().code(), "BUSY");
        assert_eq!(*seen.lock().unwrap(), 0);

        let again = scanner.scan_all_tools(None).await.unwrap();
        assert_eq!(again[0].found_configs.len(), 1);
    }
}
