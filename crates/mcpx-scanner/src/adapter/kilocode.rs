//! Kilo Code adapter
//!
//! Native shape: terse field names (`lang`, `desc`, `deps`), `config`,
//! `created` / `modified`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::{decode_native, encode_native, ToolAdapter};
use crate::canonical::{canonicalize, CollectionDraft, SnippetDraft};
use crate::model::McpCollection;

pub struct KiloCodeAdapter;

#[derive(Debug, Default, Serialize, Deserialize)]
struct KiloFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default)]
    snippets: Vec<KiloSnippet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    #[serde(default)]
    tags: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deps: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    modified: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct KiloSnippet {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    desc: Option<String>,
    #[serde(default)]
    tags: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<Map<String, Value>>,
}

impl ToolAdapter for KiloCodeAdapter {
    fn to_native(&self, c: &McpCollection) -> Value {
        let file = KiloFile {
            id: Some(c.id.clone()),
            snippets: c
                .code_snippets
                .iter()
                .map(|s| KiloSnippet {
                    id: Some(s.id.clone()),
                    content: Some(s.content.clone()),
                    lang: Some(s.language.clone()),
                    desc: s.description.clone(),
                    tags: s.tags.clone(),
                    context: s.context.clone(),
                })
                .collect(),
            name: Some(c.metadata.name.clone()),
            desc: c.metadata.description.clone(),
            version: Some(c.metadata.version.clone()),
            author: c.metadata.author.clone(),
            tags: c.metadata.tags.clone(),
            deps: c.metadata.dependencies.clone(),
            config: c.metadata.configuration.clone(),
            created: Some(c.created_at.to_rfc3339()),
            modified: Some(c.updated_at.to_rfc3339()),
        };
        encode_native(&file)
    }

    fn from_native(&self, value: Value, source_tool: &str) -> Option<McpCollection> {
        let file: KiloFile = decode_native(value)?;
        let draft = CollectionDraft {
            id: file.id,
            snippets: file
                .snippets
                .into_iter()
                .map(|s| SnippetDraft {
                    id: s.id,
                    content: s.content,
                    language: s.lang,
                    description: s.desc,
                    tags: s.tags,
                    context: s.context,
                })
                .collect(),
            name: file.name,
            version: file.version,
            description: file.desc,
            author: file.author,
            tags: file.tags,
            dependencies: file.deps,
            configuration: file.config,
            enabled: None,
            created_at: file.created,
            updated_at: file.modified,
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
    fn test_terse_fields_map_to_canonical() {
        let value = json!({
            "name": "kilo",
            "desc": "Kilo pack",
            "deps": ["deno"],
            "snippets": [{ "content": "Deno.serve()", "lang": "typescript", "desc": "server" }]
        });
        let c = KiloCodeAdapter.from_native(value, "kilo-code").unwrap();
        assert_eq!(c.metadata.description.as_deref(), Some("Kilo pack"));
        assert_eq!(c.metadata.dependencies, Some(vec!["deno".to_string()]));
        assert_eq!(c.code_snippets[0].language, "typescript");
        assert_eq!(c.code_snippets[0].description.as_deref(), Some("server"));
    }
}
