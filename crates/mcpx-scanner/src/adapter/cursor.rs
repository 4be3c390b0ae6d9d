//! Cursor adapter
//!
//! Native shape: flat metadata, `code[].content`, `settings`,
//! `created` / `lastModified`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::{decode_native, encode_native, ToolAdapter};
use crate::canonical::{canonicalize, CollectionDraft, SnippetDraft};
use crate::model::McpCollection;

pub struct CursorAdapter;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CursorFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default)]
    code: Vec<CursorSnippet>,
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
    settings: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_modified: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CursorSnippet {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default)]
    tags: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<Map<String, Value>>,
}

impl ToolAdapter for CursorAdapter {
    fn to_native(&self, c: &McpCollection) -> Value {
        let file = CursorFile {
            id: Some(c.id.clone()),
            code: c
                .code_snippets
                .iter()
                .map(|s| CursorSnippet {
                    id: Some(s.id.clone()),
                    content: Some(s.content.clone()),
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
            settings: c.metadata.configuration.clone(),
            created: Some(c.created_at.to_rfc3339()),
            last_modified: Some(c.updated_at.to_rfc3339()),
        };
        encode_native(&file)
    }

    fn from_native(&self, value: Value, source_tool: &str) -> Option<McpCollection> {
        let file: CursorFile = decode_native(value)?;
        let draft = CollectionDraft {
            id: file.id,
            snippets: file
                .code
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
            name: file.name,
            version: file.version,
            description: file.description,
            author: file.author,
            tags: file.tags,
            dependencies: file.dependencies,
            configuration: file.settings,
            enabled: None,
            created_at: file.created,
            updated_at: file.last_modified,
        };
        Some(canonicalize(draft, source_tool))
    }

    fn markers(&self) -> &'static [&'static str] {
        &["code"]
    }
}
