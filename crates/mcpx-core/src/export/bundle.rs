//! Collection bundles
//!
//! Export shapes:
//! - every tool: `{ "tools": [ToolProfile], "configs": [McpCollection] }`
//! - one tool: `{ "tool": ToolProfile, "configs": [McpCollection] }`
//!
//! Import accepts both, plus a bare `[McpCollection]` array written by
//! older versions.

use mcpx_scanner::profile::merge_profiles;
use mcpx_scanner::{fingerprint, McpCollection, ToolProfile};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use super::ExportError;
use crate::catalog::CollectionCatalog;

/// Export of every tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportBundle {
    pub tools: Vec<ToolProfile>,
    pub configs: Vec<McpCollection>,
}

/// Export of a single tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolExport {
    pub tool: ToolProfile,
    pub configs: Vec<McpCollection>,
}

/// Normalized import payload, whatever shape it came in
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedBundle {
    pub tools: Vec<ToolProfile>,
    pub configs: Vec<McpCollection>,
}

/// Outcome of an import
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub added: usize,
    pub skipped_duplicates: usize,
    pub tools: usize,
}

/// Serialize every profile and collection
///
/// # Errors
/// Returns an error if the catalog cannot be read
pub fn export_all(catalog: &CollectionCatalog) -> Result<String, ExportError> {
    let bundle = ExportBundle {
        tools: catalog.tool_profiles()?,
        configs: catalog.list()?,
    };
    Ok(serde_json::to_string_pretty(&bundle)?)
}

/// Serialize one tool's profile and collections
///
/// # Errors
/// Returns an error if the tool has no profile or the catalog cannot be read
pub fn export_tool(catalog: &CollectionCatalog, tool_id: &str) -> Result<String, ExportError> {
    let tool = catalog
        .tool_profiles()?
        .into_iter()
        .find(|p| p.id == tool_id)
        .ok_or_else(|| ExportError::UnknownTool(tool_id.to_string()))?;
    let export = ToolExport {
        configs: catalog.list_for_tool(&tool.id)?,
        tool,
    };
    Ok(serde_json::to_string_pretty(&export)?)
}

/// Decode any accepted import shape
///
/// # Errors
/// Returns an error for invalid JSON or an unknown shape
pub fn parse_import(content: &str) -> Result<ImportedBundle, ExportError> {
    let value: Value = serde_json::from_str(content)?;
    match &value {
        Value::Array(_) => Ok(ImportedBundle {
            tools: Vec::new(),
            configs: serde_json::from_value(value)?,
        }),
        Value::Object(obj) if obj.contains_key("tools") && obj.contains_key("configs") => {
            let bundle: ExportBundle = serde_json::from_value(value)?;
            Ok(ImportedBundle {
                tools: bundle.tools,
                configs: bundle.configs,
            })
        }
        Value::Object(obj) if obj.contains_key("tool") && obj.contains_key("configs") => {
            let export: ToolExport = serde_json::from_value(value)?;
            Ok(ImportedBundle {
                tools: vec![export.tool],
                configs: export.configs,
            })
        }
        Value::Object(_) => Err(ExportError::UnrecognizedShape(
            "expected 'configs' with 'tools' or 'tool'".to_string(),
        )),
        other => Err(ExportError::UnrecognizedShape(format!(
            "expected an object or array, found {}",
            kind(other)
        ))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Merge an imported bundle into the catalog
///
/// Profiles replace saved ones with the same id. Collections already in the
/// catalog (by fingerprint) are skipped; colliding ids are reassigned.
///
/// # Errors
/// Returns an error if the catalog cannot be read or written
pub fn import_into(catalog: &CollectionCatalog, bundle: ImportedBundle) -> Result<ImportReport, ExportError> {
    if !bundle.tools.is_empty() {
        let merged = merge_profiles(catalog.tool_profiles()?, &bundle.tools);
        catalog.save_profiles(&merged)?;
    }

    let mut seen: HashSet<String> = catalog.list()?.iter().map(fingerprint).collect();
    let mut fresh = Vec::new();
    let mut skipped_duplicates = 0;
    for config in bundle.configs {
        if seen.insert(fingerprint(&config)) {
            fresh.push(config);
        } else {
            skipped_duplicates += 1;
        }
    }

    Ok(ImportReport {
        added: catalog.add_all(fresh)?.len(),
        skipped_duplicates,
        tools: bundle.tools.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use mcpx_scanner::Metadata;
    use std::sync::Arc;

    fn catalog() -> CollectionCatalog {
        CollectionCatalog::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_export_all_then_import_elsewhere() {
        let source = catalog();
        source.create("cursor", Metadata::named("fs")).unwrap();
        source.create("codex", Metadata::named("git")).unwrap();
        let json = export_all(&source).unwrap();

        let target = catalog();
        let report = import_into(&target, parse_import(&json).unwrap()).unwrap();
        assert_eq!(report.added, 2);
        assert_eq!(report.tools, source.tool_profiles().unwrap().len());
        assert_eq!(target.list().unwrap(), source.list().unwrap());

        let again = import_into(&target, parse_import(&json).unwrap()).unwrap();
        assert_eq!(again.added, 0);
        assert_eq!(again.skipped_duplicates, 2);
    }

    #[test]
    fn test_single_tool_shape() {
        let source = catalog();
        source.create("cursor", Metadata::named("fs")).unwrap();
        source.create("codex", Metadata::named("git")).unwrap();
        let json = export_tool(&source, "cursor").unwrap();

        let imported = parse_import(&json).unwrap();
        assert_eq!(imported.tools.len(), 1);
        assert_eq!(imported.tools[0].id, "cursor");
        assert_eq!(imported.configs.len(), 1);

        assert_eq!(export_tool(&source, "notepad").unwrap_err().code(), "UNKNOWN_TOOL");
    }

    #[test]
    fn test_legacy_array_shape() {
        let source = catalog();
        let c = source.create("cursor", Metadata::named("fs")).unwrap();
        let json = serde_json::to_string(&vec![c.clone()]).unwrap();

        let imported = parse_import(&json).unwrap();
        assert!(imported.tools.is_empty());
        assert_eq!(imported.configs, vec![c]);
    }

    #[test]
    fn test_unrecognized_shapes() {
        assert_eq!(parse_import(r#"{"items": []}"#).unwrap_err().code(), "UNRECOGNIZED_SHAPE");
        assert_eq!(parse_import("42").unwrap_err().code(), "UNRECOGNIZED_SHAPE");
        assert_eq!(parse_import("{not json").unwrap_err().code(), "PARSE_ERROR");
    }
}
