pub mod backup;
pub mod db;
pub mod error;
pub(crate) mod exec;
pub mod migrate;
pub mod paths;
pub mod repo;

use crate::error::{to_storage_error, Result};
use formdesk_core::{Statement, StatementExecutor, StatementResult, StorageError};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

pub use repo::{DedupePlan, SubmissionRow, SubmissionsRepo};

/// Local SQLite storage. Implements [`StatementExecutor`] so the core
/// submitter runs against it directly.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = db::open(path)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = db::open_in_memory()?;
        Ok(Self { conn })
    }

    pub fn migrate(&self) -> Result<()> {
        migrate::run_migrations(&self.conn)
    }

    pub fn schema_version(&self) -> Result<i64> {
        migrate::schema_version(&self.conn)
    }

    pub fn backup_to(&self, path: &Path) -> Result<PathBuf> {
        backup::snapshot_to(&self.conn, path)
    }

    pub fn restore_from(&mut self, path: &Path) -> Result<()> {
        backup::restore_from(&mut self.conn, path)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn submissions(&self) -> SubmissionsRepo<'_, Self> {
        SubmissionsRepo::new(self)
    }

    pub fn dedupe_membership_emails(&self, apply: bool) -> Result<DedupePlan> {
        repo::dedupe_membership_emails(self, apply)
    }
}

impl StatementExecutor for Store {
    fn execute(&self, statement: &Statement) -> std::result::Result<StatementResult, StorageError> {
        exec::execute(&self.conn, statement).map_err(to_storage_error)
    }

    fn execute_batch(
        &self,
        statements: &[Statement],
    ) -> std::result::Result<Vec<StatementResult>, StorageError> {
        exec::execute_batch(&self.conn, statements).map_err(to_storage_error)
    }
}
