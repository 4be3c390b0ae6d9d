//! `mcpx scan`

use anyhow::Result;
use clap::{Args, ValueEnum};
use mcpx_core::catalog::Selection;
use mcpx_scanner::output::{to_json, to_markdown};
use mcpx_scanner::{DeduplicationAnalyzer, LocalToolScanner, ScanProgress, ScanResult, ScanStatus};

use super::Context;

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Markdown,
}

/// Arguments for `mcpx scan`
#[derive(Args)]
pub struct ScanArgs {
    /// Only scan these tool ids (repeatable)
    #[arg(short, long = "tool", value_name = "ID")]
    pub tools: Vec<String>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: ReportFormat,

    /// Save every found configuration to the catalog
    #[arg(long)]
    pub save: bool,
}

pub async fn execute(ctx: &Context, args: ScanArgs) -> Result<()> {
    let scanner = LocalToolScanner::new(ctx.fs.clone())
        .with_profiles(ctx.profiles()?)
        .with_logger(ctx.logger.clone())
        .with_confidence(ctx.settings.scan.confidence);

    let progress = |p: ScanProgress| tracing::debug!(current = p.current, total = p.total, "{}", p.message);
    let results = if args.tools.is_empty() {
        scanner.scan_all_tools(Some(&progress)).await?
    } else {
        scanner.scan_tools(&args.tools, Some(&progress)).await?
    };

    match args.format {
        ReportFormat::Json => println!("{}", to_json(&results)?),
        ReportFormat::Markdown => println!("{}", to_markdown(&results)),
        ReportFormat::Text => print_summary(&results, ctx.settings.scan.enable_threshold),
    }

    if args.save {
        let selections: Vec<Selection> = results
            .iter()
            .flat_map(|r| {
                r.found_configs
                    .iter()
                    .map(|c| Selection::new(r.tool_id.clone(), c.clone()))
            })
            .collect();
        let report = ctx
            .catalog()
            .confirm(&selections, ctx.settings.scan.enable_threshold)?;
        eprintln!(
            "Saved {} collection(s), skipped {} duplicate(s).",
            report.added.len(),
            report.skipped_duplicates
        );
    }

    Ok(())
}

fn print_summary(results: &[ScanResult], threshold: f64) {
    for result in results {
        let status = match result.status {
            ScanStatus::Success => "ok",
            ScanStatus::Partial => "partial",
            ScanStatus::Failed => "failed",
        };
        println!("{} [{}]: {} config(s)", result.tool_name, status, result.found_configs.len());
        if let Some(message) = &result.error_message {
            println!("  {message}");
        }

        let collections: Vec<_> = result
            .found_configs
            .iter()
            .map(|c| c.to_collection(&result.tool_id, threshold))
            .collect();
        let duplicates = DeduplicationAnalyzer.analyze(&collections).duplicate_count();

        for config in &result.found_configs {
            println!(
                "  {} ({:.0}%) {}",
                config.name,
                config.confidence * 100.0,
                config.source_file.display()
            );
        }
        if duplicates > 0 {
            println!("  {duplicates} duplicate(s) would be skipped on save");
        }
    }
}
