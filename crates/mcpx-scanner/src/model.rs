//! Canonical MCP collection model
//!
//! Every tool adapter converts to and from these types. Field names
//! serialize in camelCase, which is also the interchange shape used by
//! exports and by the GitHub Copilot / Claude Code adapters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::canonical;

/// One canonical MCP collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpCollection {
    /// Unique id within a store
    pub id: String,
    /// Tool id this collection belongs to
    pub source_tool: String,
    /// Code snippets (may be empty)
    #[serde(default)]
    pub code_snippets: Vec<CodeSnippet>,
    /// Collection metadata
    pub metadata: Metadata,
    /// Whether the collection is active in its tool
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp, never before `created_at`
    pub updated_at: DateTime<Utc>,
}

fn default_enabled() -> bool {
    true
}

/// One code snippet inside a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSnippet {
    /// Unique id within the parent collection
    pub id: String,
    /// Snippet body
    pub content: String,
    /// Language of the snippet body
    pub language: String,
    /// Free-form tags
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional tool-specific context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Map<String, Value>>,
}

/// Collection metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Display name (required)
    pub name: String,
    /// Version string (required)
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<String>>,
    /// Tool configuration payload (for scanned servers: command/args/env)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<Map<String, Value>>,
}

impl Metadata {
    /// Metadata with the given name and the default version
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: canonical::DEFAULT_VERSION.to_string(),
            description: None,
            author: None,
            tags: BTreeSet::new(),
            dependencies: None,
            configuration: None,
        }
    }
}

impl CodeSnippet {
    /// Create a snippet with a fresh id
    pub fn new(content: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            id: canonical::generate_id(),
            content: content.into(),
            language: language.into(),
            tags: BTreeSet::new(),
            description: None,
            context: None,
        }
    }
}

impl McpCollection {
    /// Create an empty collection for a tool
    pub fn new(source_tool: impl Into<String>, metadata: Metadata) -> Self {
        let now = Utc::now();
        Self {
            id: canonical::generate_id(),
            source_tool: source_tool.into(),
            code_snippets: Vec::new(),
            metadata,
            enabled: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Bump `updated_at`, keeping it at or after `created_at`
    pub fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.created_at);
    }

    /// Replace metadata and bump `updated_at`
    pub fn update_metadata(&mut self, metadata: Metadata) {
        self.metadata = metadata;
        self.touch();
    }

    /// Append a snippet, assigning a fresh id if it collides with an existing one
    ///
    /// Returns the id the snippet was stored under.
    pub fn add_snippet(&mut self, mut snippet: CodeSnippet) -> String {
        if snippet.id.is_empty() || self.code_snippets.iter().any(|s| s.id == snippet.id) {
            snippet.id = canonical::generate_id();
        }
        let id = snippet.id.clone();
        self.code_snippets.push(snippet);
        self.touch();
        id
    }

    /// Remove a snippet by id; returns whether anything was removed
    pub fn remove_snippet(&mut self, snippet_id: &str) -> bool {
        let before = self.code_snippets.len();
        self.code_snippets.retain(|s| s.id != snippet_id);
        let removed = self.code_snippets.len() != before;
        if removed {
            self.touch();
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_collection_timestamps_ordered() {
        let c = McpCollection::new("cursor", Metadata::named("fs"));
        assert!(c.updated_at >= c.created_at);
        assert!(c.enabled);
        assert_eq!(c.metadata.version, "1.0.0");
    }

    #[test]
    fn test_add_snippet_reassigns_duplicate_id() {
        let mut c = McpCollection::new("cursor", Metadata::named("fs"));
        let mut a = CodeSnippet::new("a", "rust");
        a.id = "same".to_string();
        let mut b = CodeSnippet::new("b", "rust");
        b.id = "same".to_string();

        assert_eq!(c.add_snippet(a), "same");
        let second = c.add_snippet(b);
        assert_ne!(second, "same");
        assert_eq!(c.code_snippets.len(), 2);
    }

    #[test]
    fn test_remove_snippet() {
        let mut c = McpCollection::new("cursor", Metadata::named("fs"));
        let id = c.add_snippet(CodeSnippet::new("x", "json"));
        assert!(c.remove_snippet(&id));
        assert!(!c.remove_snippet(&id));
        assert!(c.code_snippets.is_empty());
    }

    #[test]
    fn test_camel_case_serialization() {
        let c = McpCollection::new("codex", Metadata::named("fs"));
        let json = serde_json::to_value(&c).unwrap();
        assert!(json.get("sourceTool").is_some());
        assert!(json.get("codeSnippets").is_some());
        assert!(json.get("createdAt").is_some());
    }
}
