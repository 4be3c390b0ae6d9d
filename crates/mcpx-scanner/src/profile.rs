//! Tool profiles: where each tool keeps its MCP configuration

use serde::{Deserialize, Serialize};

use crate::adapter::Tool;

/// Markers that identify MCP server configuration in any tool's file
pub const MCP_MARKERS: &[&str] = &["mcpServers", "@modelcontextprotocol"];

/// Static descriptor of one tool's configuration locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolProfile {
    /// Stable tool id (`cursor`, `claude-code`, ...)
    pub id: String,
    /// Display name
    pub name: String,
    /// Candidate file paths, scanned in order; `~` expands to home
    pub paths: Vec<String>,
    /// Content markers that suggest MCP configuration
    #[serde(default)]
    pub markers: Vec<String>,
}

impl ToolProfile {
    pub fn new(id: &str, name: &str, paths: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            paths: paths.iter().map(ToString::to_string).collect(),
            markers: MCP_MARKERS.iter().map(ToString::to_string).collect(),
        }
    }

    /// The migration tool for this profile; `None` for scan-only tools
    #[must_use]
    pub fn tool(&self) -> Option<Tool> {
        self.id.parse().ok()
    }

    /// Whether collections found for this tool can be migrated
    #[must_use]
    pub fn is_migratable(&self) -> bool {
        self.tool().is_some()
    }
}

/// Built-in profiles, in scan order
#[must_use]
pub fn default_profiles() -> Vec<ToolProfile> {
    vec![
        ToolProfile::new(
            "cursor",
            "Cursor",
            &[
                "~/.cursor/mcp.json",
                "~/Library/Application Support/Cursor/mcp.json",
                "~/.config/cursor/mcp.json",
            ],
        ),
        ToolProfile::new(
            "claude-code",
            "Claude Code",
            &[
                "~/Library/Application Support/Claude Code/mcp.json",
                "~/.claude/mcp.json",
                "~/.config/claude-code/mcp.json",
            ],
        ),
        ToolProfile::new(
            "kilo-code",
            "Kilo Code",
            &[
                "~/.kilo/mcp.json",
                "~/Library/Application Support/Kilo Code/mcp.json",
                "~/.config/kilo/mcp.json",
            ],
        ),
        ToolProfile::new(
            "github-copilot",
            "GitHub Copilot",
            &[
                "~/.config/gh-copilot/mcp.json",
                "~/.github/copilot/mcp.json",
                "~/Library/Application Support/GitHub Desktop/copilot/mcp.json",
            ],
        ),
        ToolProfile::new(
            "tabnine",
            "Tabnine",
            &[
                "~/.tabnine/mcp.json",
                "~/Library/Application Support/Tabnine/mcp.json",
                "~/.config/tabnine/mcp.json",
            ],
        ),
        ToolProfile::new(
            "codex",
            "Codex",
            &["~/.codex/mcp.json", "~/.config/codex/mcp.json"],
        ),
        ToolProfile::new(
            "windsurf",
            "Windsurf",
            &[
                "~/.windsurf/mcp.json",
                "~/Library/Application Support/Windsurf/mcp.json",
                "~/.config/windsurf/mcp.json",
            ],
        ),
        ToolProfile::new(
            "continue",
            "Continue",
            &[
                "~/.continue/mcp.json",
                "~/Library/Application Support/Continue/mcp.json",
                "~/.config/continue/mcp.json",
            ],
        ),
    ]
}

/// Merge override profiles into a base list; an override with an existing id
/// replaces that profile in place, new ids are appended
#[must_use]
pub fn merge_profiles(base: Vec<ToolProfile>, overrides: &[ToolProfile]) -> Vec<ToolProfile> {
    let mut merged = base;
    for profile in overrides {
        match merged.iter_mut().find(|p| p.id == profile.id) {
            Some(existing) => *existing = profile.clone(),
            None => merged.push(profile.clone()),
        }
    }
    merged
}
