//! Contract between the submission core and whichever store executes SQL.
//!
//! Adapters normalize their transport's response into [`StatementResult`]
//! once, at the boundary; nothing above this module inspects raw payloads.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(value) => Some(*value),
            Value::Text(value) => value.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub rows_affected: u64,
    pub last_insert_id: Option<i64>,
}

impl StatementResult {
    pub fn first_value(&self) -> Option<&Value> {
        self.rows.first().and_then(|row| row.first())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// Transport failure or timeout; safe to retry.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// The store refused the statement (constraint, syntax, schema).
    #[error("storage rejected statement: {0}")]
    Rejected(String),
}

impl StorageError {
    pub fn message(&self) -> &str {
        match self {
            StorageError::Unavailable(message) | StorageError::Rejected(message) => message,
        }
    }

    /// Best-effort text match for uniqueness violations reported by the store.
    ///
    /// Foreign key, NOT NULL and CHECK failures are constraint errors too but
    /// never match.
    pub fn is_uniqueness_violation(&self) -> bool {
        match self {
            StorageError::Rejected(message) => {
                let lower = message.to_ascii_lowercase();
                lower.contains("unique constraint failed")
                    || lower.contains("sqlite_constraint_unique")
            }
            StorageError::Unavailable(_) => false,
        }
    }
}

pub trait StatementExecutor {
    fn execute(&self, statement: &Statement) -> Result<StatementResult, StorageError>;

    fn execute_batch(
        &self,
        statements: &[Statement],
    ) -> Result<Vec<StatementResult>, StorageError> {
        statements.iter().map(|stmt| self.execute(stmt)).collect()
    }
}

impl<T: StatementExecutor + ?Sized> StatementExecutor for &T {
    fn execute(&self, statement: &Statement) -> Result<StatementResult, StorageError> {
        (**self).execute(statement)
    }

    fn execute_batch(
        &self,
        statements: &[Statement],
    ) -> Result<Vec<StatementResult>, StorageError> {
        (**self).execute_batch(statements)
    }
}
