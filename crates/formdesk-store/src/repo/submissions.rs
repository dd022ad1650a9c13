use crate::error::Result;
use formdesk_core::mapping;
use formdesk_core::{RecordId, Statement, StatementExecutor, SubmissionKind, Value};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionRow {
    pub id: RecordId,
    pub submitted_at: Option<String>,
    pub owner: Option<i64>,
    pub values: Vec<(String, Value)>,
}

impl SubmissionRow {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }
}

/// Read side for reviewers. Works against any executor so the same listing
/// serves local and remote stores.
pub struct SubmissionsRepo<'a, E: StatementExecutor + ?Sized> {
    executor: &'a E,
}

impl<'a, E: StatementExecutor + ?Sized> SubmissionsRepo<'a, E> {
    pub fn new(executor: &'a E) -> Self {
        Self { executor }
    }

    /// Most recent first.
    pub fn list_recent(&self, kind: SubmissionKind, limit: u32) -> Result<Vec<SubmissionRow>> {
        let mapping = mapping::for_kind(kind);
        let columns = mapping.columns();
        let sql = format!(
            "SELECT id, {}, {}, {} FROM {} ORDER BY id DESC LIMIT ?1;",
            timestamp_column(kind),
            mapping.owner_column,
            columns.join(", "),
            mapping.table
        );
        let result = self
            .executor
            .execute(&Statement::new(sql).bind(i64::from(limit)))?;

        let mut rows = Vec::with_capacity(result.rows.len());
        for row in result.rows {
            rows.push(row_from_values(&columns, row));
        }
        Ok(rows)
    }

    pub fn count(&self, kind: SubmissionKind) -> Result<i64> {
        let mapping = mapping::for_kind(kind);
        let result = self
            .executor
            .execute(&Statement::new(format!("SELECT COUNT(*) FROM {};", mapping.table)))?;
        Ok(result.first_value().and_then(Value::as_i64).unwrap_or(0))
    }
}

fn timestamp_column(kind: SubmissionKind) -> &'static str {
    match kind {
        SubmissionKind::Membership => "application_date",
        _ => "created_at",
    }
}

fn row_from_values(columns: &[&str], row: Vec<Value>) -> SubmissionRow {
    let mut cells = row.into_iter();
    let id = cells.next().and_then(|v| v.as_i64()).unwrap_or_default();
    let submitted_at = cells
        .next()
        .and_then(|v| v.as_str().map(str::to_string));
    let owner = cells.next().and_then(|v| v.as_i64());
    let values = columns
        .iter()
        .map(|column| (column.to_string(), cells.next().unwrap_or(Value::Null)))
        .collect();
    SubmissionRow {
        id: RecordId::new(id),
        submitted_at,
        owner,
        values,
    }
}
