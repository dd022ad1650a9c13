use crate::error::{Result, StoreError};
use formdesk_core::{Statement, StatementExecutor, Value};
use rusqlite::{Connection, OptionalExtension, Transaction};
use tracing::{debug, info};

pub const MIGRATIONS: &[(&str, &str)] = &[
    ("001_init.sql", include_str!("../migrations/001_init.sql")),
    (
        "002_unique_emails.sql",
        include_str!("../migrations/002_unique_emails.sql"),
    ),
];

const SCHEMA_TABLE_SQL: &str =
    "CREATE TABLE IF NOT EXISTS formdesk_schema (version INTEGER NOT NULL);";

pub fn latest_version() -> i64 {
    MIGRATIONS.len() as i64
}

pub fn run_migrations(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    ensure_schema_table(&tx)?;
    let current = current_version(&tx)?;
    check_not_newer(current)?;

    for (index, (name, sql)) in MIGRATIONS.iter().enumerate() {
        let version = (index + 1) as i64;
        if current >= version {
            continue;
        }
        tx.execute_batch(sql).map_err(|err| migration_failed(name, err))?;
        set_version(&tx, version)?;
        info!(migration = *name, version, "applied migration");
    }

    tx.commit()?;
    Ok(())
}

pub fn schema_version(conn: &Connection) -> Result<i64> {
    let version: Option<i64> = conn
        .query_row("SELECT version FROM formdesk_schema LIMIT 1;", [], |row| {
            row.get(0)
        })
        .optional()
        .or_else(|err| match err {
            rusqlite::Error::SqliteFailure(_, Some(ref message))
                if message.contains("no such table") =>
            {
                Ok(None)
            }
            other => Err(other),
        })?;
    Ok(version.unwrap_or(0))
}

/// Applies pending migrations through any statement executor, one migration
/// per batch. Used for stores reached over HTTP, where a local transaction is
/// not available.
pub fn run_migrations_with<E: StatementExecutor + ?Sized>(executor: &E) -> Result<()> {
    executor.execute(&Statement::new(SCHEMA_TABLE_SQL))?;
    let existing = executor.execute(&Statement::new(
        "SELECT version FROM formdesk_schema LIMIT 1;",
    ))?;
    let current = match existing.first_value().and_then(Value::as_i64) {
        Some(version) => version,
        None => {
            executor.execute(&Statement::new(
                "INSERT INTO formdesk_schema (version) VALUES (0);",
            ))?;
            0
        }
    };
    check_not_newer(current)?;

    for (index, (name, sql)) in MIGRATIONS.iter().enumerate() {
        let version = (index + 1) as i64;
        if current >= version {
            continue;
        }
        let mut batch: Vec<Statement> = split_statements(sql)
            .into_iter()
            .map(Statement::new)
            .collect();
        batch.push(Statement::new("UPDATE formdesk_schema SET version = ?1;").bind(version));
        debug!(migration = *name, statements = batch.len(), "sending migration batch");
        executor
            .execute_batch(&batch)
            .map_err(|err| StoreError::Migration(format!("{}: {}", name, err)))?;
        info!(migration = *name, version, "applied migration");
    }
    Ok(())
}

/// Splits a migration file into individual statements. Migration files keep
/// semicolons out of literals and comments so a plain split is sufficient.
pub fn split_statements(sql: &str) -> Vec<String> {
    let without_comments: String = sql
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");
    without_comments
        .split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty())
        .map(|stmt| format!("{};", stmt))
        .collect()
}

fn check_not_newer(current: i64) -> Result<()> {
    if current > latest_version() {
        return Err(StoreError::Migration(format!(
            "db version {} newer than available migrations {}",
            current,
            latest_version()
        )));
    }
    Ok(())
}

fn migration_failed(name: &str, err: rusqlite::Error) -> StoreError {
    let message = err.to_string();
    if message.to_ascii_lowercase().contains("unique") {
        return StoreError::Migration(format!(
            "{}: {} (duplicate membership emails exist; run dedupe-emails --apply first)",
            name, message
        ));
    }
    StoreError::Migration(format!("{}: {}", name, message))
}

fn ensure_schema_table(tx: &Transaction<'_>) -> Result<()> {
    tx.execute_batch(SCHEMA_TABLE_SQL)?;

    let existing: Option<i64> = tx
        .query_row("SELECT version FROM formdesk_schema LIMIT 1;", [], |row| {
            row.get(0)
        })
        .optional()?;

    if existing.is_none() {
        tx.execute("INSERT INTO formdesk_schema (version) VALUES (0);", [])?;
    }

    Ok(())
}

fn current_version(tx: &Transaction<'_>) -> Result<i64> {
    let version: i64 = tx.query_row(
        "SELECT version FROM formdesk_schema LIMIT 1;",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

fn set_version(tx: &Transaction<'_>, version: i64) -> Result<()> {
    let updated = tx.execute("UPDATE formdesk_schema SET version = ?1;", [version])?;
    if updated != 1 {
        return Err(StoreError::Migration(format!(
            "expected single schema row, updated {}",
            updated
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{split_statements, MIGRATIONS};

    #[test]
    fn split_statements_drops_comments_and_blanks() {
        let sql = "-- header; with semicolon\nCREATE TABLE a (x INTEGER);\n\nCREATE INDEX i ON a (x);\n";
        assert_eq!(
            split_statements(sql),
            vec![
                "CREATE TABLE a (x INTEGER);".to_string(),
                "CREATE INDEX i ON a (x);".to_string()
            ]
        );
    }

    #[test]
    fn every_migration_splits_into_statements() {
        for (name, sql) in MIGRATIONS {
            assert!(!split_statements(sql).is_empty(), "{} is empty", name);
        }
    }
}
