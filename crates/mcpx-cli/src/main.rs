//! MCPX CLI - Command-line interface for MCPX
//!
//! Provides `mcpx scan`, `mcpx migrate`, `mcpx rollback`, `mcpx tasks`, and other commands.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mcpx_scanner::FileFormat;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use commands::migrate::MigrateArgs;
use commands::scan::ScanArgs;
use commands::tasks::TaskCommands;
use commands::Context;

/// Environment variable holding the log filter
const LOG_ENV: &str = "MCPX_LOG";

#[derive(Parser)]
#[command(name = "mcpx")]
#[command(about = "MCPX - MCP configuration migration between AI coding tools")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan every tool for MCP configuration
    Scan(ScanArgs),
    /// List saved collections
    List {
        /// Only show collections of this tool
        #[arg(short, long)]
        tool: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Migrate saved collections from one tool to another
    Migrate(MigrateArgs),
    /// Retry the failed items of a migration task
    Retry {
        /// Task id
        task_id: String,
        /// Also write the results to the target tool's configuration file
        #[arg(long)]
        write: bool,
        /// Output the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Undo a `--write` by restoring its backup
    Rollback {
        /// Backup id printed by `migrate --write`
        backup_id: String,
    },
    /// Inspect and manage migration tasks
    Tasks {
        #[command(subcommand)]
        action: TaskCommands,
    },
    /// Convert a single configuration file between tools
    Convert {
        /// Input file
        input: PathBuf,
        /// Source tool id
        #[arg(long)]
        from: String,
        /// Target tool id
        #[arg(long)]
        to: String,
        /// Output format (json, yaml)
        #[arg(short, long)]
        format: Option<FileFormat>,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export saved collections and tool profiles as JSON
    Export {
        /// Only export this tool
        #[arg(short, long)]
        tool: Option<String>,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Import collections from an export file
    Import {
        /// Export file
        file: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Scan(args) => commands::scan::execute(&Context::open()?, args).await,
        Commands::List { tool, json } => commands::collections::list(&Context::open()?, tool.as_deref(), json),
        Commands::Migrate(args) => commands::migrate::execute(&Context::open()?, args).await,
        Commands::Retry { task_id, write, json } => {
            commands::migrate::retry(&Context::open()?, &task_id, write, json).await
        }
        Commands::Rollback { backup_id } => commands::migrate::rollback(&Context::open()?, &backup_id).await,
        Commands::Tasks { action } => commands::tasks::execute(&Context::open()?, action),
        Commands::Convert {
            input,
            from,
            to,
            format,
            output,
        } => commands::transfer::convert_file(&input, &from, &to, format, output.as_deref()),
        Commands::Export { tool, output } => {
            commands::transfer::export(&Context::open()?, tool.as_deref(), output.as_deref())
        }
        Commands::Import { file } => commands::transfer::import(&Context::open()?, &file),
    }
}
