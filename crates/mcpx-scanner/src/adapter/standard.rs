//! Standard shape adapter (GitHub Copilot, Claude Code)
//!
//! The native shape is the canonical camelCase layout, but read loosely so
//! hand-edited files with missing fields still go through canonicalization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::{decode_native, encode_native, ToolAdapter};
use crate::canonical::{canonicalize, CollectionDraft, SnippetDraft};
use crate::model::McpCollection;

/// Adapter for the standard camelCase layout
pub struct StandardAdapter;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StandardFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default)]
    code_snippets: Vec<StandardSnippet>,
    #[serde(default)]
    metadata: StandardMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StandardMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    #[serde(default)]
    tags: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dependencies: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    configuration: Option<Map<String, Value>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StandardSnippet {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    #[serde(default)]
    tags: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<Map<String, Value>>,
}

impl ToolAdapter for StandardAdapter {
    fn to_native(&self, c: &McpCollection) -> Value {
        let file = StandardFile {
            id: Some(c.id.clone()),
            code_snippets: c
                .code_snippets
                .iter()
                .map(|s| StandardSnippet {
                    id: Some(s.id.clone()),
                    content: Some(s.content.clone()),
                    language: Some(s.language.clone()),
                    tags: s.tags.clone(),
                    description: s.description.clone(),
                    context: s.context.clone(),
                })
                .collect(),
            metadata: StandardMetadata {
                name: Some(c.metadata.name.clone()),
                version: Some(c.metadata.version.clone()),
                description: c.metadata.description.clone(),
                author: c.metadata.author.clone(),
                tags: c.metadata.tags.clone(),
                dependencies: c.metadata.dependencies.clone(),
                configuration: c.metadata.configuration.clone(),
            },
            enabled: Some(c.enabled),
            created_at: Some(c.created_at.to_rfc3339()),
            updated_at: Some(c.updated_at.to_rfc3339()),
        };
        encode_native(&file)
    }

    fn from_native(&self, value: Value, source_tool: &str) -> Option<McpCollection> {
        let file: StandardFile = decode_native(value)?;
        let draft = CollectionDraft {
            id: file.id,
            snippets: file
                .code_snippets
                .into_iter()
                .map(|s| SnippetDraft {
                    id: s.id,
                    content: s.content,
                    language: s.language,
                    description: s.description,
                    tags: s.tags,
                    context: s.context,
                })
                .collect(),
            name: file.metadata.name,
            version: file.metadata.version,
            description: file.metadata.description,
            author: file.metadata.author,
            tags: file.metadata.tags,
            dependencies: file.metadata.dependencies,
            configuration: file.metadata.configuration,
            enabled: file.enabled,
            created_at: file.created_at,
            updated_at: file.updated_at,
        };
        Some(canonicalize(draft, source_tool))
    }

    fn markers(&self) -> &'static [&'static str] {
        &["codeSnippets"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_partial_file_uses_defaults() {
        let value = json!({
            "codeSnippets": [{ "content": "console.log(1)" }],
            "metadata": { "name": "logger" }
        });
        let c = StandardAdapter.from_native(value, "github-copilot").unwrap();
        assert_eq!(c.metadata.name, "logger");
        assert_eq!(c.metadata.version, "1.0.0");
        assert_eq!(c.code_snippets[0].language, "javascript");
    }

    #[test]
    fn test_tags_must_be_an_array() {
        let value = json!({ "metadata": { "name": "x", "tags": "oops" } });
        assert!(StandardAdapter.from_native(value, "claude-code").is_none());
    }
}
