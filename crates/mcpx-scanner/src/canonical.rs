//! Canonicalization: the single place where missing native fields get defaults
//!
//! Adapters never invent values themselves. They lift their native shape into a
//! [`CollectionDraft`] with every field optional, and [`canonicalize`] applies
//! the table below.
//!
//! | Field                 | Default when missing or empty |
//! |-----------------------|-------------------------------|
//! | collection `id`       | fresh UUID                    |
//! | `metadata.name`       | `"Unknown"`                   |
//! | `metadata.version`    | `"1.0.0"`                     |
//! | snippet `id`          | fresh UUID                    |
//! | snippet `language`    | `"javascript"`                |
//! | snippet `content`     | `""` (fails validation)       |
//! | `tags`                | empty set                     |
//! | `createdAt`           | now                           |
//! | `updatedAt`           | now, clamped to `createdAt`   |

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::model::{CodeSnippet, McpCollection, Metadata};

pub const DEFAULT_NAME: &str = "Unknown";
pub const DEFAULT_VERSION: &str = "1.0.0";
pub const DEFAULT_LANGUAGE: &str = "javascript";

/// Field → default table, in the order documented above
pub const DEFAULTS: &[(&str, &str)] = &[
    ("metadata.name", DEFAULT_NAME),
    ("metadata.version", DEFAULT_VERSION),
    ("snippet.language", DEFAULT_LANGUAGE),
    ("snippet.content", ""),
];

/// Generate a fresh collection/snippet/task id
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// A collection lifted from a native shape, before defaults are applied
#[derive(Debug, Clone, Default)]
pub struct CollectionDraft {
    pub id: Option<String>,
    pub snippets: Vec<SnippetDraft>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub tags: BTreeSet<String>,
    pub dependencies: Option<Vec<String>>,
    pub configuration: Option<Map<String, Value>>,
    pub enabled: Option<bool>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// A snippet lifted from a native shape, before defaults are applied
#[derive(Debug, Clone, Default)]
pub struct SnippetDraft {
    pub id: Option<String>,
    pub content: Option<String>,
    pub language: Option<String>,
    pub description: Option<String>,
    pub tags: BTreeSet<String>,
    pub context: Option<Map<String, Value>>,
}

/// Treat `None` and `Some("")` the same way
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Apply the defaults table and produce a canonical collection
pub fn canonicalize(draft: CollectionDraft, source_tool: &str) -> McpCollection {
    let now = Utc::now();
    let created_at = parse_timestamp(draft.created_at.as_deref()).unwrap_or(now);
    let updated_at = parse_timestamp(draft.updated_at.as_deref())
        .unwrap_or(now)
        .max(created_at);

    McpCollection {
        id: non_empty(draft.id).unwrap_or_else(generate_id),
        source_tool: source_tool.to_string(),
        code_snippets: draft.snippets.into_iter().map(canonicalize_snippet).collect(),
        metadata: Metadata {
            name: non_empty(draft.name).unwrap_or_else(|| DEFAULT_NAME.to_string()),
            version: non_empty(draft.version).unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            description: draft.description,
            author: draft.author,
            tags: draft.tags,
            dependencies: draft.dependencies,
            configuration: draft.configuration,
        },
        enabled: draft.enabled.unwrap_or(true),
        created_at,
        updated_at,
    }
}

fn canonicalize_snippet(draft: SnippetDraft) -> CodeSnippet {
    CodeSnippet {
        id: non_empty(draft.id).unwrap_or_else(generate_id),
        content: draft.content.unwrap_or_default(),
        language: non_empty(draft.language).unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        tags: draft.tags,
        description: draft.description,
        context: draft.context,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_draft_gets_every_default() {
        let draft = CollectionDraft {
            snippets: vec![SnippetDraft::default()],
            ..CollectionDraft::default()
        };
        let c = canonicalize(draft, "tabnine");

        assert!(!c.id.is_empty());
        assert_eq!(c.source_tool, "tabnine");
        assert_eq!(c.metadata.name, DEFAULT_NAME);
        assert_eq!(c.metadata.version, DEFAULT_VERSION);
        assert_eq!(c.code_snippets[0].language, DEFAULT_LANGUAGE);
        assert_eq!(c.code_snippets[0].content, "");
        assert!(c.enabled);
    }

    #[test]
    fn test_empty_strings_are_treated_as_missing() {
        let draft = CollectionDraft {
            name: Some(String::new()),
            version: Some(String::new()),
            ..CollectionDraft::default()
        };
        let c = canonicalize(draft, "cursor");
        assert_eq!(c.metadata.name, "Unknown");
        assert_eq!(c.metadata.version, "1.0.0");
    }

    #[test]
    fn test_updated_at_clamped_to_created_at() {
        let draft = CollectionDraft {
            created_at: Some("2024-05-02T00:00:00Z".to_string()),
            updated_at: Some("2024-05-01T00:00:00Z".to_string()),
            ..CollectionDraft::default()
        };
        let c = canonicalize(draft, "codex");
        assert_eq!(c.updated_at, c.created_at);
    }

    #[test]
    fn test_defaults_table_matches_constants() {
        let lookup = |field: &str| DEFAULTS.iter().find(|(f, _)| *f == field).map(|(_, v)| *v);
        assert_eq!(lookup("metadata.version"), Some(DEFAULT_VERSION));
        assert_eq!(lookup("snippet.language"), Some(DEFAULT_LANGUAGE));
    }
}
