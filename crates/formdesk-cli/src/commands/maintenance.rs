use crate::commands::{print_json, Backend, Context};
use anyhow::{Context as _, Result};
use clap::Args;
use formdesk_store::error::StoreError;
use formdesk_store::migrate;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Args)]
pub struct InitArgs {}

#[derive(Debug, Args)]
pub struct DedupeArgs {
    /// Delete the duplicate rows instead of only listing them
    #[arg(long)]
    pub apply: bool,
}

#[derive(Debug, Args)]
pub struct BackupArgs {
    pub path: PathBuf,
}

#[derive(Debug, Args)]
pub struct RestoreArgs {
    pub path: PathBuf,
}

#[derive(Debug, Serialize)]
struct InitReport {
    backend: &'static str,
    schema_version: i64,
}

#[derive(Debug, Serialize)]
struct BackupReport {
    output: String,
    size_bytes: u64,
}

pub fn init(ctx: &Context<'_>, _args: InitArgs) -> Result<()> {
    let schema_version = match ctx.backend {
        Backend::Local(store) => {
            store.migrate().with_context(|| "run migrations")?;
            store.schema_version()?
        }
        Backend::Remote(remote) => {
            migrate::run_migrations_with(remote).with_context(|| "migrate remote store")?;
            migrate::latest_version()
        }
    };

    if ctx.json {
        return print_json(&InitReport {
            backend: ctx.backend.name(),
            schema_version,
        });
    }
    println!(
        "{} store ready at schema version {}",
        ctx.backend.name(),
        schema_version
    );
    Ok(())
}

/// Runs against a local store whose unique-email migration is still blocked
/// by legacy duplicates; the remaining migrations are retried after `--apply`.
pub fn dedupe_emails(ctx: &Context<'_>, args: DedupeArgs) -> Result<()> {
    if let Some(store) = ctx.backend.local() {
        if let Err(err) = store.migrate() {
            warn!(error = %err, "migrations pending until duplicate emails are removed");
        }
    }
    let plan = formdesk_store::repo::dedupe_membership_emails(ctx.executor(), args.apply)?;
    if plan.applied {
        if let Some(store) = ctx.backend.local() {
            store
                .migrate()
                .with_context(|| "run migrations after removing duplicates")?;
        }
    }
    if ctx.json {
        return print_json(&plan);
    }

    if plan.is_empty() {
        println!("no duplicate membership emails");
        return Ok(());
    }
    for group in &plan.groups {
        let removed: Vec<String> = group.remove.iter().map(i64::to_string).collect();
        println!(
            "{}: keep {}, {} {}",
            group.email,
            group.keep,
            if plan.applied { "removed" } else { "would remove" },
            removed.join(", ")
        );
    }
    if !plan.applied {
        println!("re-run with --apply to delete {} row(s)", plan.removed_count());
    }
    Ok(())
}

pub fn backup(ctx: &Context<'_>, args: BackupArgs) -> Result<()> {
    let store = ctx.local_store("backup")?;
    let out = match store.backup_to(&args.path) {
        Ok(out) => out,
        Err(err @ StoreError::InvalidBackupPath(_)) => {
            return Err(err).with_context(|| {
                format!("backup path matches database: {}", args.path.display())
            });
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("backup database to {}", args.path.display()));
        }
    };

    let size = fs::metadata(&out)
        .with_context(|| format!("stat backup file {}", out.display()))?
        .len();

    if ctx.json {
        return print_json(&BackupReport {
            output: out.display().to_string(),
            size_bytes: size,
        });
    }
    println!("Backup written to {}", out.display());
    Ok(())
}

/// Needs the backend mutably, so it runs outside the shared context.
pub fn restore(backend: &mut Backend, json: bool, args: RestoreArgs) -> Result<()> {
    let store = backend
        .local_mut()
        .ok_or_else(|| crate::error::invalid_input("restore requires local storage"))?;
    store
        .restore_from(&args.path)
        .with_context(|| format!("restore database from {}", args.path.display()))?;
    store.migrate().with_context(|| "run migrations")?;

    if json {
        return print_json(&serde_json::json!({ "restored_from": args.path.display().to_string() }));
    }
    println!("Database restored from {}", args.path.display());
    Ok(())
}
