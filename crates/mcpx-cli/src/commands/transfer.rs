//! `mcpx convert`, `mcpx export` and `mcpx import`

use anyhow::{Context as _, Result};
use mcpx_core::export::{export_all, export_tool, import_into, parse_import};
use mcpx_core::migration::convert;
use mcpx_scanner::{FileFormat, Tool};
use std::path::Path;

use super::{tool_id, Context};

pub fn convert_file(
    input: &Path,
    from: &str,
    to: &str,
    format: Option<FileFormat>,
    output: Option<&Path>,
) -> Result<()> {
    let from: Tool = from.parse()?;
    let to: Tool = to.parse()?;
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let file_name = input.file_name().and_then(|n| n.to_str());

    let converted = convert(&content, file_name, from, to, format)?;
    match output {
        Some(path) => {
            std::fs::write(path, converted)?;
            println!("Wrote {} configuration to: {}", to.display_name(), path.display());
        }
        None => println!("{converted}"),
    }
    Ok(())
}

pub fn export(ctx: &Context, tool: Option<&str>, output: Option<&Path>) -> Result<()> {
    let catalog = ctx.catalog();
    let json = match tool {
        Some(tool) => export_tool(&catalog, &tool_id(tool))?,
        None => export_all(&catalog)?,
    };
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            println!("Exported to: {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub fn import(ctx: &Context, file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let report = import_into(&ctx.catalog(), parse_import(&content)?)?;
    println!(
        "Imported {} collection(s), skipped {} duplicate(s), {} tool profile(s).",
        report.added, report.skipped_duplicates, report.tools
    );
    Ok(())
}
