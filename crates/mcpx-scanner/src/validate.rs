//! Structural validation of canonical collections

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::model::{CodeSnippet, McpCollection, Metadata};

/// Outcome of a validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// A passing result with no messages
    #[must_use]
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// A failing result with a single error
    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            errors: vec![error.into()],
            warnings: Vec::new(),
        }
    }

    /// Build from collected messages; valid iff there are no errors
    #[must_use]
    pub fn from_messages(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// Validate a canonical collection
///
/// Errors: empty id or source tool, missing metadata `name`/`version`,
/// invalid snippets, duplicate snippet ids, `updatedAt` before `createdAt`.
/// An empty snippet list is only a warning.
pub fn validate_collection(collection: &McpCollection) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if collection.id.trim().is_empty() {
        errors.push("Collection must have a non-empty id".to_string());
    }
    if collection.source_tool.trim().is_empty() {
        errors.push("Collection must name its source tool".to_string());
    }

    if collection.code_snippets.is_empty() {
        warnings.push("Collection contains no code snippets".to_string());
    }

    let mut seen = HashSet::new();
    for (index, snippet) in collection.code_snippets.iter().enumerate() {
        errors.extend(validate_snippet(snippet, index));
        if !snippet.id.is_empty() && !seen.insert(snippet.id.as_str()) {
            errors.push(format!("Snippet[{index}]: duplicate id '{}'", snippet.id));
        }
    }

    errors.extend(validate_metadata(&collection.metadata));

    if collection.updated_at < collection.created_at {
        errors.push("updatedAt is earlier than createdAt".to_string());
    }

    ValidationResult::from_messages(errors, warnings)
}

fn validate_snippet(snippet: &CodeSnippet, index: usize) -> Vec<String> {
    let mut errors = Vec::new();
    if snippet.id.trim().is_empty() {
        errors.push(format!("Snippet[{index}]: missing id"));
    }
    if snippet.content.trim().is_empty() {
        errors.push(format!("Snippet[{index}]: missing content"));
    }
    if snippet.language.trim().is_empty() {
        errors.push(format!("Snippet[{index}]: missing language"));
    }
    errors
}

fn validate_metadata(metadata: &Metadata) -> Vec<String> {
    let mut errors = Vec::new();
    if metadata.name.trim().is_empty() {
        errors.push("Metadata is missing required field: name".to_string());
    }
    if metadata.version.trim().is_empty() {
        errors.push("Metadata is missing required field: version".to_string());
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CodeSnippet, Metadata};

    fn sample() -> McpCollection {
        let mut c = McpCollection::new("cursor", Metadata::named("filesystem"));
        c.add_snippet(CodeSnippet::new("{\"command\":\"npx\"}", "json"));
        c
    }

    #[test]
    fn test_valid_collection() {
        let result = validate_collection(&sample());
        assert!(result.is_valid, "{:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_empty_snippets_is_warning_only() {
        let c = McpCollection::new("cursor", Metadata::named("x"));
        let result = validate_collection(&c);
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_missing_version_fails() {
        let mut c = sample();
        c.metadata.version = String::new();
        let result = validate_collection(&c);
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.contains("version")));
    }

    #[test]
    fn test_empty_snippet_content_fails() {
        let mut c = sample();
        c.code_snippets[0].content = "  ".to_string();
        assert!(!validate_collection(&c).is_valid);
    }

    #[test]
    fn test_duplicate_snippet_ids_fail() {
        let mut c = sample();
        let dup = c.code_snippets[0].clone();
        c.code_snippets.push(dup);
        let result = validate_collection(&c);
        assert!(result.errors.iter().any(|e| e.contains("duplicate id")));
    }
}
