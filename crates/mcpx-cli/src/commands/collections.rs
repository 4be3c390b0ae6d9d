//! `mcpx list`

use anyhow::Result;

use super::{print_json, tool_id, Context};

pub fn list(ctx: &Context, tool: Option<&str>, json: bool) -> Result<()> {
    let catalog = ctx.catalog();
    let collections = match tool {
        Some(tool) => catalog.list_for_tool(&tool_id(tool))?,
        None => catalog.list()?,
    };

    if json {
        return print_json(&collections);
    }

    if collections.is_empty() {
        println!("No collections found.");
        return Ok(());
    }
    for c in collections {
        let state = if c.enabled { "enabled" } else { "disabled" };
        println!(
            "  {} - {} [{}] ({} snippet(s), {})",
            c.id,
            c.metadata.name,
            c.source_tool,
            c.code_snippets.len(),
            state
        );
    }
    Ok(())
}
