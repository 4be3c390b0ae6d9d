//! MCP configuration extraction
//!
//! Pulls candidate server configurations out of a decoded file. Supports:
//! 1. Wrapped format: `{"mcpServers": {"name": {...}}}`, or the same map
//!    under any key listed in the tool profile's markers
//! 2. A native collection in the tool's own shape
//! 3. Flat format: `{"name": {"command": ...}}`
//! 4. Generic fallback: top-level `command` / `args` / `env`
//!
//! Each strategy carries its own confidence from [`ConfidenceTable`]. The
//! first strategy that yields anything wins.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::adapter::Tool;

/// Confidence per extraction strategy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceTable {
    /// `mcpServers` entry that references an `@modelcontextprotocol` package
    pub server_with_marker: f64,
    /// Any other `mcpServers` entry
    pub server_entry: f64,
    /// File in the tool's native collection shape
    pub native_collection: f64,
    /// Flat `name -> server` map
    pub flat_server_map: f64,
    /// Top-level `command` / `args` / `env` fields
    pub generic_fallback: f64,
}

impl Default for ConfidenceTable {
    fn default() -> Self {
        Self {
            server_with_marker: 0.9,
            server_entry: 0.8,
            native_collection: 0.7,
            flat_server_map: 0.6,
            generic_fallback: 0.5,
        }
    }
}

/// One candidate configuration pulled out of a file
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub name: String,
    pub description: String,
    pub raw_config: Value,
    pub confidence: f64,
}

/// Name given to configurations found by the generic fallback
pub const GENERIC_NAME: &str = "generic-config";

/// Key of the standard server map
pub const SERVER_MAP_KEY: &str = "mcpServers";

/// Whether a value carries `mcpServers` or any of the given markers, as a
/// key or anywhere in its content
pub fn has_mcp_markers<S: AsRef<str>>(value: &Value, markers: &[S]) -> bool {
    if value.get(SERVER_MAP_KEY).is_some() {
        return true;
    }
    let text = value.to_string();
    markers.iter().any(|m| {
        let marker: &str = m.as_ref();
        value.get(marker).is_some() || text.contains(marker)
    })
}

/// Run the extraction strategies against a decoded file
///
/// `markers` are the tool profile's markers; an object under any of them is
/// read as a server map, just like `mcpServers`.
pub fn extract<S: AsRef<str>>(
    value: &Value,
    tool: Option<Tool>,
    markers: &[S],
    table: &ConfidenceTable,
) -> Vec<Extracted> {
    let Some(obj) = value.as_object() else {
        return Vec::new();
    };

    let server_maps = std::iter::once(SERVER_MAP_KEY)
        .chain(markers.iter().map(AsRef::as_ref))
        .filter_map(|key| obj.get(key).and_then(Value::as_object));
    for servers in server_maps {
        let found = from_server_map(servers, |server| {
            if references_mcp_package(server) {
                table.server_with_marker
            } else {
                table.server_entry
            }
        });
        if !found.is_empty() {
            return found;
        }
    }

    if let Some(found) = tool.and_then(|t| from_native_collection(value, t, table)) {
        return vec![found];
    }

    if obj.values().all(is_server_like) {
        let found = from_server_map(obj, |_| table.flat_server_map);
        if !found.is_empty() {
            return found;
        }
    }

    generic_fallback(obj, table).into_iter().collect()
}

fn from_server_map(servers: &Map<String, Value>, confidence: impl Fn(&Value) -> f64) -> Vec<Extracted> {
    servers
        .iter()
        .filter(|(_, server)| server.is_object())
        .map(|(name, server)| Extracted {
            name: name.clone(),
            description: server
                .get("description")
                .and_then(Value::as_str)
                .map_or_else(|| format!("Converted from {name} configuration"), ToString::to_string),
            raw_config: server.clone(),
            confidence: confidence(server),
        })
        .collect()
}

fn from_native_collection(value: &Value, tool: Tool, table: &ConfidenceTable) -> Option<Extracted> {
    let adapter = tool.adapter();
    if !adapter.matches(value) {
        return None;
    }
    let collection = adapter.from_native(value.clone(), tool.id())?;
    Some(Extracted {
        description: collection
            .metadata
            .description
            .clone()
            .unwrap_or_else(|| format!("{} collection", tool.display_name())),
        name: collection.metadata.name,
        raw_config: value.clone(),
        confidence: table.native_collection,
    })
}

fn generic_fallback(obj: &Map<String, Value>, table: &ConfidenceTable) -> Option<Extracted> {
    let command = obj.get("command").filter(|v| v.is_string());
    let args = obj.get("args").filter(|v| v.is_array());
    let url = obj.get("url").filter(|v| v.is_string());
    if command.is_none() && args.is_none() && url.is_none() {
        return None;
    }

    let mut config = Map::new();
    if let Some(command) = command {
        config.insert("command".to_string(), command.clone());
    }
    if let Some(args) = args {
        config.insert("args".to_string(), args.clone());
    }
    if let Some(url) = url {
        config.insert("url".to_string(), url.clone());
    }
    if let Some(env) = obj.get("env").or_else(|| obj.get("environment")).filter(|v| v.is_object()) {
        config.insert("env".to_string(), env.clone());
    }

    Some(Extracted {
        name: obj
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(GENERIC_NAME)
            .to_string(),
        description: "Extracted from generic configuration fields".to_string(),
        raw_config: Value::Object(config),
        confidence: table.generic_fallback,
    })
}

fn is_server_like(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|o| o.get("command").is_some_and(Value::is_string) || o.get("url").is_some_and(Value::is_string))
}

fn references_mcp_package(server: &Value) -> bool {
    server.to_string().contains("@modelcontextprotocol")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::MCP_MARKERS;
    use serde_json::json;

    #[test]
    fn test_wrapped_servers() {
        let value = json!({
            "mcpServers": {
                "filesystem": { "command": "npx", "args": ["-y", "@modelcontextprotocol/server-filesystem"] },
                "custom": { "command": "/usr/bin/custom", "description": "In-house server" }
            }
        });
        let found = extract(&value, Some(Tool::Cursor), MCP_MARKERS, &ConfidenceTable::default());
        assert_eq!(found.len(), 2);
        let fs = found.iter().find(|f| f.name == "filesystem").unwrap();
        assert!((fs.confidence - 0.9).abs() < f64::EPSILON);
        let custom = found.iter().find(|f| f.name == "custom").unwrap();
        assert!((custom.confidence - 0.8).abs() < f64::EPSILON);
        assert_eq!(custom.description, "In-house server");
    }

    #[test]
    fn test_flat_server_map() {
        let value = json!({ "supabase": { "type": "http", "url": "https://mcp.supabase.com/mcp" } });
        let found = extract(&value, None, MCP_MARKERS, &ConfidenceTable::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "supabase");
        assert!((found[0].confidence - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_native_collection() {
        let value = json!({ "name": "rules", "code": [{ "content": "x", "language": "sql" }] });
        let found = extract(&value, Some(Tool::Cursor), MCP_MARKERS, &ConfidenceTable::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "rules");
        assert!((found[0].confidence - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_generic_fallback() {
        let value = json!({ "command": "npx", "args": ["-y", "@modelcontextprotocol/server-filesystem", "/tmp"] });
        let found = extract(&value, Some(Tool::Cursor), MCP_MARKERS, &ConfidenceTable::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, GENERIC_NAME);
        assert!((found[0].confidence - 0.5).abs() < f64::EPSILON);
        assert_eq!(found[0].raw_config["command"], "npx");
    }

    #[test]
    fn test_nothing_recognizable() {
        let value = json!({ "theme": "dark", "fontSize": 12 });
        assert!(extract(&value, Some(Tool::Cursor), MCP_MARKERS, &ConfidenceTable::default()).is_empty());
        assert!(extract(&json!([1, 2]), None, MCP_MARKERS, &ConfidenceTable::default()).is_empty());
    }

    #[test]
    fn test_markers() {
        assert!(has_mcp_markers(&json!({ "mcpServers": {} }), MCP_MARKERS));
        assert!(has_mcp_markers(&json!({ "args": ["@modelcontextprotocol/server-git"] }), MCP_MARKERS));
        assert!(!has_mcp_markers(&json!({ "theme": "dark" }), MCP_MARKERS));
        assert!(has_mcp_markers(&json!({ "context_servers": {} }), &["context_servers"]));
    }

    #[test]
    fn test_profile_marker_key_is_a_server_map() {
        let value = json!({
            "theme": "dark",
            "context_servers": {
                "fs": { "command": "npx", "args": ["-y", "@modelcontextprotocol/server-filesystem"] },
                "git": { "command": "uvx", "args": ["mcp-server-git"] }
            }
        });
        assert!(extract(&value, None, MCP_MARKERS, &ConfidenceTable::default()).is_empty());

        let found = extract(&value, None, &["context_servers"], &ConfidenceTable::default());
        assert_eq!(found.len(), 2);
        let fs = found.iter().find(|f| f.name == "fs").unwrap();
        assert!((fs.confidence - 0.9).abs() < f64::EPSILON);
        let git = found.iter().find(|f| f.name == "git").unwrap();
        assert!((git.confidence - 0.8).abs() < f64::EPSILON);
    }
}
