use super::FormMapping;
use crate::storage::{Statement, StatementExecutor, StorageError};
use serde::Serialize;

/// Columns the store manages itself; never expected to be fed by a form.
const STORE_MANAGED: &[&str] = &[
    "id",
    "status",
    "created_at",
    "application_date",
    "reviewed_at",
    "reviewed_by",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftReport {
    pub table: &'static str,
    pub table_exists: bool,
    /// Columns the mapping writes that the live table does not have.
    pub missing_columns: Vec<String>,
    /// Live columns no form field feeds.
    pub unfed_columns: Vec<String>,
}

impl DriftReport {
    pub fn is_clean(&self) -> bool {
        self.table_exists && self.missing_columns.is_empty()
    }
}

pub fn verify_mapping<E: StatementExecutor + ?Sized>(
    executor: &E,
    mapping: &FormMapping,
) -> Result<DriftReport, StorageError> {
    let result = executor.execute(
        &Statement::new("SELECT name FROM pragma_table_info(?1);").bind(mapping.table),
    )?;
    let live: Vec<String> = result
        .rows
        .iter()
        .filter_map(|row| row.first().and_then(|value| value.as_str()))
        .map(str::to_string)
        .collect();

    let mut expected = mapping.columns();
    expected.push(mapping.owner_column);

    let missing_columns = if live.is_empty() {
        Vec::new()
    } else {
        expected
            .iter()
            .filter(|column| !live.iter().any(|name| name == *column))
            .map(|column| column.to_string())
            .collect()
    };
    let unfed_columns = live
        .iter()
        .filter(|name| !expected.contains(&name.as_str()))
        .filter(|name| !STORE_MANAGED.contains(&name.as_str()))
        .cloned()
        .collect();

    Ok(DriftReport {
        table: mapping.table,
        table_exists: !live.is_empty(),
        missing_columns,
        unfed_columns,
    })
}
