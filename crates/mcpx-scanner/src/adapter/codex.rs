//! Codex adapter
//!
//! Native shape: nested `metadata` with `config`, `code_snippets[].code`,
//! per-snippet `metadata` used as context, `created_at` / `updated_at`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::{decode_native, encode_native, ToolAdapter};
use crate::canonical::{canonicalize, CollectionDraft, SnippetDraft};
use crate::model::McpCollection;

pub struct CodexAdapter;

#[derive(Debug, Default, Serialize, Deserialize)]
struct CodexFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default)]
    code_snippets: Vec<CodexSnippet>,
    #[serde(default)]
    metadata: CodexMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CodexMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    #[serde(default)]
    tags: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dependencies: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<Map<String, Value>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CodexSnippet {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default)]
    tags: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<Map<String, Value>>,
}

impl ToolAdapter for CodexAdapter {
    fn to_native(&self, c: &McpCollection) -> Value {
        let file = CodexFile {
            id: Some(c.id.clone()),
            code_snippets: c
                .code_snippets
                .iter()
                .map(|s| CodexSnippet {
                    id: Some(s.id.clone()),
                    code: Some(s.content.clone()),
                    language: Some(s.language.clone()),
                    description: s.description.clone(),
                    tags: s.tags.clone(),
                    metadata: s.context.clone(),
                })
                .collect(),
            metadata: CodexMetadata {
                name: Some(c.metadata.name.clone()),
                description: c.metadata.description.clone(),
                version: Some(c.metadata.version.clone()),
                author: c.metadata.author.clone(),
                tags: c.metadata.tags.clone(),
                dependencies: c.metadata.dependencies.clone(),
                config: c.metadata.configuration.clone(),
            },
            created_at: Some(c.created_at.to_rfc3339()),
            updated_at: Some(c.updated_at.to_rfc3339()),
        };
        encode_native(&file)
    }

    fn from_native(&self, value: Value, source_tool: &str) -> Option<McpCollection> {
        let file: CodexFile = decode_native(value)?;
        let draft = CollectionDraft {
            id: file.id,
            snippets: file
                .code_snippets
                .into_iter()
                .map(|s| SnippetDraft {
                    id: s.id,
                    content: s.code,
                    language: s.language,
                    description: s.description,
                    tags: s.tags,
                    context: s.metadata,
                })
                .collect(),
            name: file.metadata.name,
            version: file.metadata.version,
            description: file.metadata.description,
            author: file.metadata.author,
            tags: file.metadata.tags,
            dependencies: file.metadata.dependencies,
            configuration: file.metadata.config,
            enabled: None,
            created_at: file.created_at,
            updated_at: file.updated_at,
        };
        Some(canonicalize(draft, source_tool))
    }

    fn markers(&self) -> &'static [&'static str] {
        &["code_snippets"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snippet_metadata_becomes_context() {
        let value = json!({
            "metadata": { "name": "codex-pack", "config": { "model": "o4" } },
            "code_snippets": [{ "code": "print(1)", "language": "python", "metadata": { "line": 3 } }]
        });
        let c = CodexAdapter.from_native(value, "codex").unwrap();
        assert_eq!(c.metadata.name, "codex-pack");
        assert_eq!(c.code_snippets[0].context.as_ref().unwrap()["line"], json!(3));
        assert_eq!(c.metadata.configuration.unwrap()["model"], json!("o4"));
    }

    #[test]
    fn test_configuration_survives_round_trip() {
        let value = json!({ "metadata": { "name": "x", "config": { "k": 1 } } });
        let c = CodexAdapter.from_native(value, "codex").unwrap();
        let back = CodexAdapter.from_native(CodexAdapter.to_native(&c), "codex").unwrap();
        assert_eq!(back.metadata.configuration, c.metadata.configuration);
    }
}
