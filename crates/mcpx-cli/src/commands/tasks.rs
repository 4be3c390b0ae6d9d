//! `mcpx tasks`

use anyhow::Result;
use clap::Subcommand;
use mcpx_core::export::{export_history, parse_history};
use mcpx_core::migration::MigrationTask;
use std::path::PathBuf;

use super::{print_json, Context};

#[derive(Subcommand)]
pub enum TaskCommands {
    /// List active tasks, or finished ones with --history
    List {
        #[arg(long)]
        history: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show task statistics
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Cancel a pending task
    Cancel {
        /// Task id
        id: String,
    },
    /// Write the task history as JSON
    Export {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Add tasks from an exported history
    Import {
        /// History file
        file: PathBuf,
    },
    /// Forget finished tasks
    Clear,
}

pub fn execute(ctx: &Context, cmd: TaskCommands) -> Result<()> {
    let service = ctx.service()?;
    match cmd {
        TaskCommands::List { history, json } => {
            let tasks = if history { service.history() } else { service.active_tasks() };
            if json {
                return print_json(&tasks);
            }
            if tasks.is_empty() {
                println!("No tasks found.");
            }
            for task in &tasks {
                print_task(task);
            }
        }
        TaskCommands::Stats { json } => {
            let stats = service.stats();
            if json {
                return print_json(&stats);
            }
            println!("Tasks: {}", stats.total_tasks);
            println!(
                "  pending {}, in progress {}, completed {}, failed {}, cancelled {}",
                stats.pending, stats.in_progress, stats.completed, stats.failed, stats.cancelled
            );
            println!(
                "Items: {} total, {} successful ({:.1}%)",
                stats.total_items, stats.successful_items, stats.success_rate
            );
        }
        TaskCommands::Cancel { id } => {
            if service.cancel_task(&id)? {
                println!("Cancelled task {id}.");
            } else {
                println!("Task {id} already finished.");
            }
        }
        TaskCommands::Export { output } => {
            let json = export_history(&service.history())?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!("Wrote history to: {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        TaskCommands::Import { file } => {
            let content = std::fs::read_to_string(&file)?;
            let added = service.import_history(parse_history(&content)?)?;
            println!("Imported {added} task(s).");
        }
        TaskCommands::Clear => {
            let removed = service.clear_history()?;
            println!("Removed {removed} task(s) from history.");
        }
    }
    Ok(())
}

fn print_task(task: &MigrationTask) {
    println!(
        "  {} - {} -> {} [{}] {} item(s), {}%",
        task.id,
        task.source_tool,
        task.target_tool,
        task.status,
        task.items.len(),
        task.progress
    );
    if let Some(error) = &task.error {
        println!("    {error}");
    }
    if !task.failed_item_ids.is_empty() {
        println!("    {} failed item(s)", task.failed_item_ids.len());
    }
}
