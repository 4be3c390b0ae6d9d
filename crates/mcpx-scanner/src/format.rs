//! File format codecs and detection
//!
//! A [`FormatAdapter`] turns file content into a JSON value and back. Tool
//! adapters then map that value to and from the canonical model, so every
//! `(format, tool)` pair works without per-pair code.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::adapter::Tool;
use crate::error::{Result, ScanError};
use crate::extract;
use crate::model::McpCollection;
use crate::profile::MCP_MARKERS;
use crate::validate::{validate_collection, ValidationResult};

/// On-disk encoding of a configuration file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Json,
    Yaml,
}

impl FileFormat {
    /// Preferred file extension
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Json => "json",
            FileFormat::Yaml => "yaml",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for FileFormat {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(FileFormat::Json),
            "yaml" | "yml" => Ok(FileFormat::Yaml),
            other => Err(ScanError::Detection(format!("unsupported format '{other}'"))),
        }
    }
}

/// Codec for one file format
///
/// `parse` and `serialize` never fail loudly: structural problems come back
/// as `None` so the caller can decide whether to skip or abort.
pub trait FormatAdapter: Send + Sync {
    /// The format this codec handles
    fn format(&self) -> FileFormat;

    /// File extensions claimed by this format (lowercase, no dot)
    fn extensions(&self) -> &'static [&'static str];

    /// Whether content looks like this format
    fn sniff(&self, content: &str) -> bool;

    /// Decode content into a JSON value
    fn decode(&self, content: &str) -> Result<Value>;

    /// Encode a JSON value as content
    fn encode(&self, value: &Value) -> Result<String>;

    /// Parse content written in `tool`'s native shape
    fn parse(&self, content: &str, tool: Tool) -> Option<McpCollection> {
        let value = self.decode(content).ok()?;
        tool.adapter().from_native(value, tool.id())
    }

    /// Serialize a collection into `tool`'s native shape
    fn serialize(&self, collection: &McpCollection, tool: Tool) -> Option<String> {
        self.encode(&tool.adapter().to_native(collection)).ok()
    }

    /// Check that content decodes and holds something usable
    fn validate(&self, content: &str) -> ValidationResult {
        match self.decode(content) {
            Ok(value) => validate_value(&value),
            Err(e) => ValidationResult::invalid(format!("Content is not valid {}: {e}", self.format())),
        }
    }
}

/// JSON codec
pub struct JsonFormat;

impl FormatAdapter for JsonFormat {
    fn format(&self) -> FileFormat {
        FileFormat::Json
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["json"]
    }

    fn sniff(&self, content: &str) -> bool {
        let trimmed = content.trim_start();
        (trimmed.starts_with('{') || trimmed.starts_with('['))
            && serde_json::from_str::<Value>(content).is_ok()
    }

    fn decode(&self, content: &str) -> Result<Value> {
        Ok(serde_json::from_str(content)?)
    }

    fn encode(&self, value: &Value) -> Result<String> {
        Ok(serde_json::to_string_pretty(value)?)
    }
}

/// YAML codec
pub struct YamlFormat;

impl FormatAdapter for YamlFormat {
    fn format(&self) -> FileFormat {
        FileFormat::Yaml
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["yaml", "yml"]
    }

    fn sniff(&self, content: &str) -> bool {
        // Plain scalars are valid YAML too; only a mapping counts as config
        matches!(self.decode(content), Ok(Value::Object(_)))
    }

    fn decode(&self, content: &str) -> Result<Value> {
        serde_yml::from_str(content).map_err(|e| ScanError::Yaml(e.to_string()))
    }

    fn encode(&self, value: &Value) -> Result<String> {
        serde_yml::to_string(value).map_err(|e| ScanError::Yaml(e.to_string()))
    }
}

/// Registry of the supported codecs
pub struct Formats;

impl Formats {
    /// Every codec, in sniffing order
    pub const ALL: [FileFormat; 2] = [FileFormat::Json, FileFormat::Yaml];

    /// Codec for a format
    #[must_use]
    pub fn get(format: FileFormat) -> &'static dyn FormatAdapter {
        match format {
            FileFormat::Json => &JsonFormat,
            FileFormat::Yaml => &YamlFormat,
        }
    }

    /// Detect the format of a file: extension first, then content sniffing
    #[must_use]
    pub fn detect(file_name: &str, content: &str) -> Option<FileFormat> {
        Self::detect_by_extension(file_name).or_else(|| Self::sniff(content))
    }

    /// Format claimed by the file extension, if any
    #[must_use]
    pub fn detect_by_extension(file_name: &str) -> Option<FileFormat> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())?
            .to_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| Self::get(*f).extensions().contains(&ext.as_str()))
    }

    /// Format recognized from content alone
    #[must_use]
    pub fn sniff(content: &str) -> Option<FileFormat> {
        if content.trim().is_empty() {
            return None;
        }
        Self::ALL.into_iter().find(|f| Self::get(*f).sniff(content))
    }

    /// Decode content, trying the given format first and then every other one
    pub fn decode_lenient(preferred: Option<FileFormat>, content: &str) -> Result<(FileFormat, Value)> {
        let order = preferred
            .into_iter()
            .chain(Self::ALL.into_iter().filter(|f| Some(*f) != preferred));
        let mut last_error = None;
        for format in order {
            match Self::get(format).decode(content) {
                Ok(value) => return Ok((format, value)),
                Err(e) => last_error = Some(e),
            }
        }
        Err(last_error.unwrap_or_else(|| ScanError::Detection("empty content".to_string())))
    }

    /// Parse content in `format` written in `tool`'s native shape
    #[must_use]
    pub fn parse(content: &str, format: FileFormat, tool: Tool) -> Option<McpCollection> {
        Self::get(format).parse(content, tool)
    }

    /// Serialize a collection in `format` using `tool`'s native shape
    #[must_use]
    pub fn serialize(collection: &McpCollection, format: FileFormat, tool: Tool) -> Option<String> {
        Self::get(format).serialize(collection, tool)
    }

    /// Validate content in `format`
    #[must_use]
    pub fn validate(content: &str, format: FileFormat) -> ValidationResult {
        Self::get(format).validate(content)
    }
}

/// Validation of a decoded value: a native collection of some tool, or an
/// MCP server map
fn validate_value(value: &Value) -> ValidationResult {
    if !value.is_object() {
        return ValidationResult::invalid("Top-level value must be an object");
    }
    if let Some(tool) = Tool::ALL.into_iter().find(|t| t.adapter().matches(value)) {
        return match tool.adapter().from_native(value.clone(), tool.id()) {
            Some(collection) => validate_collection(&collection),
            None => ValidationResult::invalid(format!(
                "Content looks like a {} collection but has the wrong structure",
                tool.display_name()
            )),
        };
    }
    if extract::has_mcp_markers(value, MCP_MARKERS) {
        return ValidationResult::from_messages(
            Vec::new(),
            vec!["Content is an MCP server map, not a collection".to_string()],
        );
    }
    ValidationResult::invalid("Content has no recognizable MCP structure")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CodeSnippet, Metadata};

    #[test]
    fn test_detect_by_extension_wins() {
        assert_eq!(Formats::detect("mcp.json", "a: b"), Some(FileFormat::Json));
        assert_eq!(Formats::detect("config.YML", "{}"), Some(FileFormat::Yaml));
    }

    #[test]
    fn test_detect_by_content() {
        assert_eq!(Formats::detect("config", r#"{"mcpServers":{}}"#), Some(FileFormat::Json));
        assert_eq!(Formats::detect("config", "mcpServers:\n  fs:\n    command: npx\n"), Some(FileFormat::Yaml));
        assert_eq!(Formats::detect("notes", "just some words"), None);
        assert_eq!(Formats::detect("empty", "  "), None);
    }

    #[test]
    fn test_yaml_parse_and_serialize() {
        let mut c = McpCollection::new("tabnine", Metadata::named("yaml-pack"));
        c.add_snippet(CodeSnippet::new("echo hi", "shell"));

        let yaml = Formats::serialize(&c, FileFormat::Yaml, Tool::Tabnine).unwrap();
        assert!(yaml.contains("snippets"));
        let back = Formats::parse(&yaml, FileFormat::Yaml, Tool::Tabnine).unwrap();
        assert_eq!(back.metadata.name, "yaml-pack");
        assert_eq!(back.code_snippets[0].content, "echo hi");
    }

    #[test]
    fn test_parse_garbage_returns_none() {
        assert!(Formats::parse("{not json", FileFormat::Json, Tool::Cursor).is_none());
    }

    #[test]
    fn test_validate_content() {
        let bad = Formats::validate("{oops", FileFormat::Json);
        assert!(!bad.is_valid);

        let servers = Formats::validate(r#"{"mcpServers":{"fs":{"command":"npx"}}}"#, FileFormat::Json);
        assert!(servers.is_valid);
        assert_eq!(servers.warnings.len(), 1);

        let collection = Formats::validate(
            r#"{"codeSnippets":[{"content":""}],"metadata":{"name":"x"}}"#,
            FileFormat::Json,
        );
        assert!(!collection.is_valid);
    }

    #[test]
    fn test_decode_lenient_falls_back() {
        let (format, value) = Formats::decode_lenient(Some(FileFormat::Json), "command: npx\n").unwrap();
        assert_eq!(format, FileFormat::Yaml);
        assert_eq!(value["command"], "npx");
    }
}
