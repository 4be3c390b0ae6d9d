//! Target file writer
//!
//! Migrated collections are written in the target tool's native shape to
//! the first candidate path of its profile. With more than one collection,
//! each goes to its own file, suffixed with the collection id.
//!
//! A target that already exists is never replaced blindly:
//! - an earlier write of the same collection is updated in place
//! - a file holding other content gets the collection's server
//!   configuration merged into its server map (`mcpServers` or a profile
//!   marker key), leaving every other entry alone
//! - anything else is a conflict and nothing is written
//!
//! Each touched file is snapshotted into a [`Backup`] before the write.

use mcpx_scanner::{FileAccess, FileFormat, Formats, LogEvent, Logger, McpCollection, NoopLogger, ScanError, Tool, ToolProfile};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::backup::{restore_backup, Backup, BackupFile};

const SOURCE: &str = "apply";

/// Server map key used when the target file has none yet
const SERVER_MAP_KEY: &str = "mcpServers";

/// Errors that can occur while writing target files
#[derive(Error, Debug)]
pub enum ApplyError {
    #[error("Tool '{0}' has no adapter and cannot be written")]
    NotMigratable(String),

    #[error("Tool '{0}' has no candidate path")]
    NoTargetPath(String),

    #[error("Collection {0} could not be serialized")]
    Serialize(String),

    #[error("Refusing to overwrite {}: {reason}", path.display())]
    Conflict { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] ScanError),
}

impl ApplyError {
    /// Get the error code for CLI/API responses
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotMigratable(_) => "UNKNOWN_TOOL",
            Self::NoTargetPath(_) => "NO_TARGET_PATH",
            Self::Serialize(_) => "SERIALIZATION_ERROR",
            Self::Conflict { .. } => "TARGET_CONFLICT",
            Self::Io(e) => e.code(),
        }
    }

    fn conflict(path: &Path, reason: impl Into<String>) -> Self {
        Self::Conflict {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

/// Outcome of a successful write
#[derive(Debug, Clone, PartialEq)]
pub struct WriteReport {
    pub written: Vec<PathBuf>,
    /// Snapshot of every written file as it was before
    pub backup: Backup,
}

/// Resolved output path per collection
///
/// # Errors
/// Returns an error if the profile has no path or home cannot be resolved
pub fn target_paths(
    fs: &dyn FileAccess,
    profile: &ToolProfile,
    collections: &[McpCollection],
) -> Result<Vec<PathBuf>, ApplyError> {
    let first = profile
        .paths
        .first()
        .ok_or_else(|| ApplyError::NoTargetPath(profile.id.clone()))?;
    let base = fs.resolve_home(first)?;

    if collections.len() <= 1 {
        return Ok(vec![base; collections.len()]);
    }
    Ok(collections.iter().map(|c| suffixed(&base, &c.id)).collect())
}

fn suffixed(base: &Path, id: &str) -> PathBuf {
    let stem = base
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("mcp");
    let name = match base.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}.{id}.{ext}"),
        None => format!("{stem}.{id}"),
    };
    base.with_file_name(name)
}

/// Server configuration carried by a collection, if it has one
fn server_config(collection: &McpCollection) -> Option<Value> {
    let config = collection.metadata.configuration.as_ref()?;
    let runnable = config.get("command").is_some_and(Value::is_string) || config.get("url").is_some_and(Value::is_string);
    runnable.then(|| Value::Object(config.clone()))
}

/// Key of the document's server map: `mcpServers` or the first profile
/// marker present as an object
fn server_map_key(doc: &Map<String, Value>, markers: &[String]) -> String {
    std::iter::once(SERVER_MAP_KEY)
        .chain(markers.iter().map(String::as_str))
        .find(|key| doc.get(*key).is_some_and(Value::is_object))
        .unwrap_or(SERVER_MAP_KEY)
        .to_string()
}

/// New content for `path` given what is there now
fn planned_content(
    tool: Tool,
    markers: &[String],
    collection: &McpCollection,
    path: &Path,
    existing: Option<&str>,
) -> Result<String, ApplyError> {
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let native = |format: FileFormat| {
        Formats::serialize(collection, format, tool).ok_or_else(|| ApplyError::Serialize(collection.id.clone()))
    };

    let Some(existing) = existing.filter(|c| !c.trim().is_empty()) else {
        return native(Formats::detect_by_extension(file_name).unwrap_or_else(|| tool.default_format()));
    };

    let (format, value) = Formats::decode_lenient(Formats::detect(file_name, existing), existing)
        .map_err(|e| ApplyError::conflict(path, format!("existing content could not be parsed ({e})")))?;

    let adapter = tool.adapter();
    if adapter.matches(&value) {
        return match adapter.from_native(value, tool.id()) {
            Some(previous) if previous.id == collection.id || previous.metadata.name == collection.metadata.name => {
                native(format)
            }
            _ => Err(ApplyError::conflict(path, "it holds a different collection")),
        };
    }

    let Value::Object(mut doc) = value else {
        return Err(ApplyError::conflict(path, "existing content is not an object"));
    };
    let Some(server) = server_config(collection) else {
        return Err(ApplyError::conflict(
            path,
            format!("collection '{}' has no server configuration to merge", collection.metadata.name),
        ));
    };

    let key = server_map_key(&doc, markers);
    let servers = doc
        .entry(key.clone())
        .or_insert_with(|| Value::Object(Map::new()));
    let Value::Object(servers) = servers else {
        return Err(ApplyError::conflict(path, format!("'{key}' is not an object")));
    };
    servers.insert(collection.metadata.name.clone(), server);

    Formats::get(format)
        .encode(&Value::Object(doc))
        .map_err(|_| ApplyError::Serialize(collection.id.clone()))
}

/// Writes collections through [`FileAccess`]
pub struct TargetWriter {
    fs: Arc<dyn FileAccess>,
    logger: Arc<dyn Logger>,
}

impl TargetWriter {
    pub fn new(fs: Arc<dyn FileAccess>) -> Self {
        Self {
            fs,
            logger: Arc::new(NoopLogger),
        }
    }

    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Write every collection for `profile`'s tool
    ///
    /// Every target is read and planned before the first write, so a
    /// conflict or a collection that cannot be serialized leaves all targets
    /// untouched. If a write fails part way, files already written are
    /// restored from the backup.
    ///
    /// # Errors
    /// Returns an error if the tool is scan-only, a target conflicts, a
    /// collection cannot be serialized, or a file operation fails
    pub async fn write(&self, profile: &ToolProfile, collections: &[McpCollection]) -> Result<WriteReport, ApplyError> {
        let tool = profile
            .tool()
            .ok_or_else(|| ApplyError::NotMigratable(profile.id.clone()))?;
        let paths = target_paths(self.fs.as_ref(), profile, collections)?;

        let mut planned = Vec::with_capacity(collections.len());
        for (collection, path) in collections.iter().zip(paths) {
            let existing = if self.fs.exists(&path).await {
                Some(self.fs.read_text(&path).await?)
            } else {
                None
            };
            let content = planned_content(tool, &profile.markers, collection, &path, existing.as_deref())?;
            let snapshot = match existing {
                Some(original) => BackupFile::existing(path.clone(), original),
                None => BackupFile::new_file(path.clone()),
            };
            planned.push((path, content, snapshot));
        }

        let mut backup = Backup::new(&profile.id).with_description(format!("Before writing {} configuration", profile.name));
        let mut written = Vec::with_capacity(planned.len());
        for (path, content, snapshot) in planned {
            backup.add_file(snapshot);
            if let Err(e) = self.fs.write_text(&path, &content).await {
                self.roll_back(&backup).await;
                return Err(e.into());
            }
            self.logger
                .log(LogEvent::info(SOURCE, format!("Wrote {}", path.display())));
            written.push(path);
        }
        Ok(WriteReport { written, backup })
    }

    async fn roll_back(&self, backup: &Backup) {
        if let Err(e) = restore_backup(self.fs.as_ref(), backup).await {
            self.logger
                .log(LogEvent::error(SOURCE, format!("Rollback after failed write incomplete: {e}")));
        }
    }
}
