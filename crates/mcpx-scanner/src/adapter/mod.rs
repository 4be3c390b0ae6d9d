//! Tool adapters
//!
//! Each supported tool stores MCP collections in its own native JSON shape.
//! A [`ToolAdapter`] owns the bidirectional mapping between that shape and the
//! canonical [`McpCollection`]. The set of tools is closed: [`Tool`] is the
//! only way to obtain an adapter.

pub mod codex;
pub mod cursor;
pub mod kilocode;
pub mod standard;
pub mod tabnine;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::ScanError;
use crate::format::FileFormat;
use crate::model::McpCollection;

pub use codex::CodexAdapter;
pub use cursor::CursorAdapter;
pub use kilocode::KiloCodeAdapter;
pub use standard::StandardAdapter;
pub use tabnine::TabnineAdapter;

/// Mapping between one native shape and the canonical model
///
/// Both directions are pure. `from_native` returns `None` when the value does
/// not have the expected structure; it never panics.
pub trait ToolAdapter: Send + Sync {
    /// Convert a canonical collection into the native JSON value
    fn to_native(&self, collection: &McpCollection) -> Value;

    /// Lift a native JSON value into a canonical collection owned by `source_tool`
    fn from_native(&self, value: Value, source_tool: &str) -> Option<McpCollection>;

    /// Top-level keys that identify this native shape
    fn markers(&self) -> &'static [&'static str];

    /// Whether a decoded value looks like this native shape
    fn matches(&self, value: &Value) -> bool {
        value
            .as_object()
            .is_some_and(|obj| self.markers().iter().any(|m| obj.contains_key(*m)))
    }
}

/// Tools with a migration adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tool {
    Cursor,
    ClaudeCode,
    KiloCode,
    GithubCopilot,
    Tabnine,
    Codex,
}

impl Tool {
    /// Every registered tool, in display order
    pub const ALL: [Tool; 6] = [
        Tool::Cursor,
        Tool::ClaudeCode,
        Tool::KiloCode,
        Tool::GithubCopilot,
        Tool::Tabnine,
        Tool::Codex,
    ];

    /// Stable tool id
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Tool::Cursor => "cursor",
            Tool::ClaudeCode => "claude-code",
            Tool::KiloCode => "kilo-code",
            Tool::GithubCopilot => "github-copilot",
            Tool::Tabnine => "tabnine",
            Tool::Codex => "codex",
        }
    }

    /// Human readable name
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Tool::Cursor => "Cursor",
            Tool::ClaudeCode => "Claude Code",
            Tool::KiloCode => "Kilo Code",
            Tool::GithubCopilot => "GitHub Copilot",
            Tool::Tabnine => "Tabnine",
            Tool::Codex => "Codex",
        }
    }

    /// File format the tool writes its configuration in
    #[must_use]
    pub fn default_format(self) -> FileFormat {
        FileFormat::Json
    }

    /// The adapter for this tool's native shape
    #[must_use]
    pub fn adapter(self) -> &'static dyn ToolAdapter {
        match self {
            Tool::Cursor => &CursorAdapter,
            Tool::ClaudeCode | Tool::GithubCopilot => &StandardAdapter,
            Tool::KiloCode => &KiloCodeAdapter,
            Tool::Tabnine => &TabnineAdapter,
            Tool::Codex => &CodexAdapter,
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Tool {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cursor" => Ok(Tool::Cursor),
            "claude-code" | "claude" => Ok(Tool::ClaudeCode),
            "kilo-code" | "kilocode" => Ok(Tool::KiloCode),
            "github-copilot" | "copilot" => Ok(Tool::GithubCopilot),
            "tabnine" => Ok(Tool::Tabnine),
            "codex" => Ok(Tool::Codex),
            _ => Err(ScanError::UnknownTool(s.to_string())),
        }
    }
}

/// Deserialize a native value, mapping structural mismatch to `None`
pub(crate) fn decode_native<T: DeserializeOwned>(value: Value) -> Option<T> {
    serde_json::from_value(value).ok()
}

/// Serialize a native struct; these structs only hold JSON-safe data
pub(crate) fn encode_native<T: Serialize>(native: &T) -> Value {
    serde_json::to_value(native).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CodeSnippet, Metadata};

    fn sample() -> McpCollection {
        let mut metadata = Metadata::named("filesystem");
        metadata.description = Some("Local files".to_string());
        metadata.dependencies = Some(vec!["node".to_string()]);
        let mut c = McpCollection::new("cursor", metadata);
        let mut snippet = CodeSnippet::new("npx -y @modelcontextprotocol/server-filesystem", "shell");
        snippet.tags.insert("fs".to_string());
        c.add_snippet(snippet);
        c
    }

    #[test]
    fn test_tool_ids_round_trip() {
        for tool in Tool::ALL {
            assert_eq!(tool.id().parse::<Tool>().unwrap(), tool);
        }
        assert_eq!("kilocode".parse::<Tool>().unwrap(), Tool::KiloCode);
        assert!("vim".parse::<Tool>().is_err());
    }

    #[test]
    fn test_every_adapter_preserves_name_and_snippets() {
        let original = sample();
        for tool in Tool::ALL {
            let adapter = tool.adapter();
            let native = adapter.to_native(&original);
            assert!(adapter.matches(&native), "{tool} output should match its markers");
            let back = adapter.from_native(native, tool.id()).expect("parse back");
            assert_eq!(back.metadata.name, original.metadata.name, "{tool}");
            assert_eq!(back.metadata.dependencies, original.metadata.dependencies, "{tool}");
            assert_eq!(back.code_snippets, original.code_snippets, "{tool}");
            assert_eq!(back.id, original.id, "{tool}");
            assert_eq!(back.source_tool, tool.id());
        }
    }

    #[test]
    fn test_non_object_is_rejected() {
        for tool in Tool::ALL {
            assert!(tool.adapter().from_native(Value::from(42), tool.id()).is_none());
        }
    }
}
