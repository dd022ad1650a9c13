mod commands;
mod error;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::debug;

use crate::commands::{accounts, forms, maintenance, submit, Backend, Context};
use crate::error::{exit_code_for, invalid_input, report_error};
use formdesk_config as config;
use formdesk_config::AppConfig;
use formdesk_core::Language;
use formdesk_remote::{RemoteOptions, RemoteStore};
use formdesk_store::{paths, Store};

#[derive(Debug, Parser)]
#[command(name = "formdesk", version, about = "Bilingual form-submission desk")]
struct Cli {
    /// Use this SQLite file (forces local storage)
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, short, global = true)]
    verbose: bool,
    /// Message language: en or ar
    #[arg(long, global = true)]
    lang: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply schema migrations
    Init(maintenance::InitArgs),
    Submit(submit::SubmitArgs),
    #[command(name = "check-email")]
    CheckEmail(forms::CheckEmailArgs),
    /// Show a form's field-to-column mapping
    Fields(forms::FieldsArgs),
    List(forms::ListArgs),
    #[command(name = "verify-schema")]
    VerifySchema(forms::VerifySchemaArgs),
    #[command(name = "dedupe-emails")]
    DedupeEmails(maintenance::DedupeArgs),
    Backup(maintenance::BackupArgs),
    Restore(maintenance::RestoreArgs),
    Register(accounts::RegisterArgs),
    Login(accounts::LoginArgs),
    Whoami(accounts::WhoamiArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, verbose);
            exit_code_for(&err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        db_path,
        config: config_path,
        json,
        verbose,
        lang,
        command,
    } = cli;

    let app_config = config::load(config_path.clone()).with_context(|| "load config")?;
    if verbose {
        match config::resolve_config_path(config_path) {
            Ok(path) if path.exists() => debug!(path = %path.display(), "config resolved"),
            Ok(path) => debug!(path = %path.display(), "config missing, using defaults"),
            Err(err) => debug!(error = %err, "config unavailable"),
        }
    }

    let language = match lang {
        Some(raw) => raw
            .parse::<Language>()
            .map_err(|err| invalid_input(err.to_string()))?,
        None => app_config.default_language,
    };

    // These commands migrate on their own terms, so a schema that cannot be
    // brought up to date yet must not stop them from opening.
    let migrate_on_open = !matches!(
        command,
        Command::Init(_) | Command::DedupeEmails(_) | Command::Restore(_)
    );
    let mut backend = open_backend(&app_config, db_path, migrate_on_open)?;
    debug!(backend = backend.name(), ?language, "backend ready");

    if let Command::Restore(args) = command {
        return maintenance::restore(&mut backend, json, args);
    }

    let ctx = Context {
        backend: &backend,
        json,
        language,
    };

    match command {
        Command::Init(args) => maintenance::init(&ctx, args),
        Command::Submit(args) => submit::submit(&ctx, args),
        Command::CheckEmail(args) => forms::check_email(&ctx, args),
        Command::Fields(args) => forms::show_fields(&ctx, args),
        Command::List(args) => forms::list_submissions(&ctx, args),
        Command::VerifySchema(args) => forms::verify_schema(&ctx, args),
        Command::DedupeEmails(args) => maintenance::dedupe_emails(&ctx, args),
        Command::Backup(args) => maintenance::backup(&ctx, args),
        Command::Register(args) => accounts::register(&ctx, args),
        Command::Login(args) => accounts::login(&ctx, args),
        Command::Whoami(args) => accounts::whoami(&ctx, args),
        Command::Restore(_) => unreachable!("restore handled before context creation"),
    }
}

/// An explicit `--db-path` always means a local file; otherwise the
/// configured backend decides.
fn open_backend(
    app_config: &AppConfig,
    db_path: Option<PathBuf>,
    migrate_on_open: bool,
) -> Result<Backend> {
    if db_path.is_none() && app_config.uses_remote() {
        let remote = app_config
            .remote
            .as_ref()
            .ok_or(config::ConfigError::MissingRemote)?;
        let mut options = RemoteOptions::new(remote.url.clone(), remote.auth_token.clone());
        options.timeout = Duration::from_secs(remote.timeout_secs);
        options.connect_timeout = Duration::from_secs(remote.connect_timeout_secs);
        let store = RemoteStore::connect(options).with_context(|| "configure remote store")?;
        debug!(endpoint = %store.endpoint(), "remote store selected");
        return Ok(Backend::Remote(store));
    }

    let db_path = db_path.or_else(|| app_config.storage.path.clone());
    let db_path = paths::resolve_db_path(db_path).with_context(|| "resolve database path")?;
    debug!(path = %db_path.display(), "database path resolved");

    let store = Store::open(&db_path)
        .with_context(|| format!("open database {}", db_path.display()))?;
    if migrate_on_open {
        store.migrate().with_context(|| "run migrations")?;
    }
    Ok(Backend::Local(store))
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
