//! Tabnine adapter
//!
//! Native shape: flat metadata, `snippets[].code`, `config`,
//! `created_at` / `updated_at`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::{decode_native, encode_native, ToolAdapter};
use crate::canonical::{canonicalize, CollectionDraft, SnippetDraft};
use crate::model::McpCollection;

pub struct TabnineAdapter;

#[derive(Debug, Default, Serialize, Deserialize)]
struct TabnineFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default)]
    snippets: Vec<TabnineSnippet>,
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
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TabnineSnippet {
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
    context: Option<Map<String, Value>>,
}

impl ToolAdapter for TabnineAdapter {
    fn to_native(&self, c: &McpCollection) -> Value {
        let file = TabnineFile {
            id: Some(c.id.clone()),
            snippets: c
                .code_snippets
                .iter()
                .map(|s| TabnineSnippet {
                    id: Some(s.id.clone()),
                    code: Some(s.content.clone()),
                    language: Some(s.language.clone()),
                    description: s.description.clone(),
                    tags: s.tags.clone(),
                    context: s.context.clone(),
                })
                .collect(),
            name: Some(c.metadata.name.clone()),
            description: c.metadata.description.clone(),
            version: Some(c.metadata.version.clone()),
            author: c.metadata.author.clone(),
            tags: c.metadata.tags.clone(),
            dependencies: c.metadata.dependencies.clone(),
            config: c.metadata.configuration.clone(),
            created_at: Some(c.created_at.to_rfc3339()),
            updated_at: Some(c.updated_at.to_rfc3339()),
        };
        encode_native(&file)
    }

    fn from_native(&self, value: Value, source_tool: &str) -> Option<McpCollection> {
        let file: TabnineFile = decode_native(value)?;
        let draft = CollectionDraft {
            id: file.id,
            snippets: file
                .snippets
                .into_iter()
                .map(|s| SnippetDraft {
                    id: s.id,
                    content: s.code,
                    language: s.language,
                    description: s.description,
                    tags: s.tags,
                    context: s.context,
                })
                .collect(),
            name: file.name,
            version: file.version,
            description: file.description,
            author: file.author,
            tags: file.tags,
            dependencies: file.dependencies,
            configuration: file.config,
            enabled: None,
            created_at: file.created_at,
            updated_at: file.updated_at,
        };
        Some(canonicalize(draft, source_tool))
    }

    fn markers(&self) -> &'static [&'static str] {
        &["snippets"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_tabnine_native() {
        let value = json!({
            "name": "snips",
            "snippets": [{ "code": "fn main() {}", "language": "rust" }],
            "config": { "autoImport": true },
            "created_at": "2024-01-01T00:00:00Z"
        });
        let c = TabnineAdapter.from_native(value, "tabnine").unwrap();
        assert_eq!(c.code_snippets[0].content, "fn main() {}");
        assert_eq!(c.code_snippets[0].language, "rust");
        assert_eq!(
            c.metadata.configuration.unwrap().get("autoImport"),
            Some(&json!(true))
        );
        assert_eq!(c.created_at.to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_serialize_uses_native_field_names() {
        let c = TabnineAdapter
            .from_native(json!({ "snippets": [{ "code": "x" }] }), "tabnine")
            .unwrap();
        let native = TabnineAdapter.to_native(&c);
        assert_eq!(native["snippets"][0]["code"], json!("x"));
        assert!(native.get("codeSnippets").is_none());
        assert!(native.get("created_at").is_some());
    }
}
