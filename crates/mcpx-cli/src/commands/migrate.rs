//! `mcpx migrate`, `mcpx retry` and `mcpx rollback`

use anyhow::{bail, Result};
use clap::Args;
use mcpx_core::apply::TargetWriter;
use mcpx_core::backup::{restore_backup, Backup, BackupLog};
use mcpx_core::migration::{MigrationProgress, MigrationResult};

use super::{print_json, tool_id, Context};

/// Arguments for `mcpx migrate`
#[derive(Args)]
pub struct MigrateArgs {
    /// Source tool id
    #[arg(long)]
    pub from: String,

    /// Target tool id
    #[arg(long)]
    pub to: String,

    /// Only migrate these collection ids (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub ids: Vec<String>,

    /// Also write the results to the target tool's configuration file
    #[arg(long)]
    pub write: bool,

    /// Output the result as JSON
    #[arg(long)]
    pub json: bool,
}

fn report_progress(p: MigrationProgress) {
    tracing::debug!(task = %p.task_id, current = p.current, total = p.total, "{}%", p.progress);
}

pub async fn execute(ctx: &Context, args: MigrateArgs) -> Result<()> {
    let (from, to) = (tool_id(&args.from), tool_id(&args.to));
    let mut items = ctx.catalog().list_for_tool(&from)?;
    if !args.ids.is_empty() {
        items.retain(|c| args.ids.contains(&c.id));
    }
    if items.is_empty() {
        bail!("No collections to migrate for '{from}'");
    }

    let service = ctx.service()?;
    let result = service
        .migrate(&from, &to, items, Some(&report_progress))
        .await?;
    finish(ctx, &to, result, args.write, args.json).await
}

pub async fn retry(ctx: &Context, task_id: &str, write: bool, json: bool) -> Result<()> {
    let service = ctx.service()?;
    let target = match service.get_task(task_id) {
        Some(task) => task.target_tool,
        None => bail!("Migration task not found: {task_id}"),
    };
    let result = service.retry_task(task_id, Some(&report_progress)).await?;
    finish(ctx, &target, result, write, json).await
}

/// Save migrated collections, optionally write them out, and report
async fn finish(ctx: &Context, target: &str, result: MigrationResult, write: bool, json: bool) -> Result<()> {
    let saved = ctx.catalog().add_all(result.migrated.clone())?;

    let mut backup: Option<Backup> = None;
    let mut written = Vec::new();
    if write && !saved.is_empty() {
        let profile = ctx.profile(target)?;
        let report = TargetWriter::new(ctx.fs.clone())
            .with_logger(ctx.logger.clone())
            .write(&profile, &saved)
            .await?;
        BackupLog::new(ctx.store.clone()).record(&report.backup)?;
        written = report.written;
        backup = Some(report.backup);
    }

    if json {
        print_json(&result)?;
    } else {
        println!(
            "Task {}: {} migrated, {} failed ({} ms)",
            result.task_id, result.migrated_count, result.failed_count, result.duration_ms
        );
        for error in &result.errors {
            println!("  error: {error}");
        }
        for warning in &result.warnings {
            println!("  warning: {warning}");
        }
        for path in &written {
            println!("  wrote {}", path.display());
        }
        if let Some(backup) = &backup {
            println!("Backup {} saved. Run 'mcpx rollback {}' to undo the write.", backup.id, backup.id);
        }
        if result.failed_count > 0 && result.success {
            println!("Run 'mcpx retry {}' to retry failed items.", result.task_id);
        }
    }

    if !result.success {
        match result.errors.first() {
            Some(error) => bail!("{}", error.message),
            None => bail!("Migration did not complete"),
        }
    }
    Ok(())
}

/// Restore the files touched by a `--write`
pub async fn rollback(ctx: &Context, backup_id: &str) -> Result<()> {
    let log = BackupLog::new(ctx.store.clone());
    let Some(backup) = log.get(backup_id)? else {
        bail!("Backup not found: {backup_id}");
    };
    let restored = restore_backup(ctx.fs.as_ref(), &backup).await?;
    log.remove(backup_id)?;
    println!("Restored {} file(s) from backup {backup_id}.", restored.len());
    Ok(())
}
