//! Markdown output formatter

use chrono::Utc;

use crate::scan::{ScanResult, ScanStatus};

/// Convert scan results to a Markdown report
#[must_use]
pub fn to_markdown(results: &[ScanResult]) -> String {
    let mut output = String::new();

    output.push_str("# MCP Scan Report\n\n");
    output.push_str(&format!(
        "**Scanned at:** {}\n\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));

    let found: usize = results.iter().map(|r| r.found_configs.len()).sum();
    let discovered = results.iter().filter(|r| r.has_configs()).count();
    output.push_str("## Summary\n\n");
    output.push_str(&format!("- **Tools scanned:** {}\n", results.len()));
    output.push_str(&format!("- **Tools with configurations:** {discovered}\n"));
    output.push_str(&format!("- **Configurations found:** {found}\n\n"));

    output.push_str("## Tools\n\n");
    for result in results {
        let status = match result.status {
            ScanStatus::Success => "success",
            ScanStatus::Partial => "partial",
            ScanStatus::Failed => "failed",
        };
        output.push_str(&format!("### {} (`{}`)\n\n", result.tool_name, result.tool_id));
        output.push_str(&format!("- **Status:** {status}\n"));
        if let Some(message) = &result.error_message {
            output.push_str(&format!("- **Error:** {message}\n"));
        }

        if result.found_configs.is_empty() {
            output.push_str("\n_No configurations found_\n\n");
            continue;
        }

        output.push_str("\n| Name | Confidence | Format | Source |\n");
        output.push_str("|------|------------|--------|--------|\n");
        for config in &result.found_configs {
            output.push_str(&format!(
                "| {} | {:.2} | {} | {} |\n",
                config.name,
                config.confidence,
                config.format,
                config.source_file.display()
            ));
        }
        output.push('\n');
    }

    output
}
