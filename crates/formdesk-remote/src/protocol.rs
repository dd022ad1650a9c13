//! Wire format of the `statements` endpoint.
//!
//! Servers in the wild answer in two shapes: a top-level array with one
//! `{"results": {...}}` or `{"error": {...}}` entry per statement, and an
//! object whose `results` field is an array of result sets. Both are folded
//! into [`StatementResult`] here so nothing downstream sees raw JSON.

use formdesk_core::{Statement, StatementResult, StorageError, Value};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

#[derive(Debug, Serialize)]
pub struct RequestBody<'a> {
    pub statements: Vec<WireStatement<'a>>,
}

#[derive(Debug, Serialize)]
pub struct WireStatement<'a> {
    pub q: &'a str,
    pub params: Vec<Json>,
}

impl<'a> RequestBody<'a> {
    pub fn new(statements: &'a [Statement]) -> Self {
        Self {
            statements: statements
                .iter()
                .map(|statement| WireStatement {
                    q: &statement.sql,
                    params: statement.params.iter().map(value_to_json).collect(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Envelope {
    PerStatement(Vec<StatementEnvelope>),
    Object(ObjectEnvelope),
}

#[derive(Debug, Deserialize)]
struct StatementEnvelope {
    results: Option<ResultSet>,
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ObjectEnvelope {
    #[serde(default)]
    results: Vec<ResultSet>,
    error: Option<ErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
struct ResultSet {
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<Json>>,
    #[serde(default, alias = "rows_affected")]
    affected_row_count: Option<u64>,
    #[serde(default)]
    last_insert_rowid: Option<Json>,
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Detailed { message: String },
    Plain(String),
}

impl ErrorBody {
    fn into_message(self) -> String {
        match self {
            ErrorBody::Detailed { message } => message,
            ErrorBody::Plain(message) => message,
        }
    }
}

/// Parses a response body into one result per submitted statement. A
/// statement-level error anywhere in the batch fails the whole call.
pub fn parse_response(body: &str, expected: usize) -> Result<Vec<StatementResult>, StorageError> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|err| StorageError::Rejected(format!("malformed response: {}", err)))?;

    let sets = match envelope {
        Envelope::PerStatement(entries) => {
            let mut sets = Vec::with_capacity(entries.len());
            for entry in entries {
                if let Some(error) = entry.error {
                    return Err(StorageError::Rejected(error.into_message()));
                }
                sets.push(entry.results.unwrap_or_default());
            }
            sets
        }
        Envelope::Object(object) => {
            if let Some(error) = object.error {
                return Err(StorageError::Rejected(error.into_message()));
            }
            object.results
        }
    };

    if sets.len() != expected {
        return Err(StorageError::Rejected(format!(
            "expected {} result sets, got {}",
            expected,
            sets.len()
        )));
    }
    sets.into_iter().map(into_statement_result).collect()
}

fn into_statement_result(set: ResultSet) -> Result<StatementResult, StorageError> {
    if let Some(error) = set.error {
        return Err(StorageError::Rejected(error.into_message()));
    }
    let rows = set
        .rows
        .into_iter()
        .map(|row| row.into_iter().map(json_to_value).collect())
        .collect();
    let rows_affected = set.affected_row_count.unwrap_or(0);
    let last_insert_id = set
        .last_insert_rowid
        .as_ref()
        .and_then(|id| json_to_value(id.clone()).as_i64());
    Ok(StatementResult {
        columns: set.columns,
        rows,
        rows_affected,
        last_insert_id,
    })
}

pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Integer(value) => Json::from(*value),
        Value::Real(value) => Json::from(*value),
        Value::Text(value) => Json::from(value.as_str()),
    }
}

/// Cells arrive either as bare JSON scalars or as typed
/// `{"type": "integer", "value": "1"}` objects.
pub fn json_to_value(json: Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(flag) => Value::Integer(i64::from(flag)),
        Json::Number(number) => match number.as_i64() {
            Some(integer) => Value::Integer(integer),
            None => number.as_f64().map(Value::Real).unwrap_or(Value::Null),
        },
        Json::String(text) => Value::Text(text),
        Json::Object(mut object) => {
            let kind = object
                .get("type")
                .and_then(Json::as_str)
                .unwrap_or_default()
                .to_string();
            let value = object.remove("value").unwrap_or(Json::Null);
            match (kind.as_str(), value) {
                ("null", _) => Value::Null,
                ("integer", Json::String(text)) => {
                    text.parse().map(Value::Integer).unwrap_or(Value::Text(text))
                }
                ("float", Json::String(text)) => {
                    text.parse().map(Value::Real).unwrap_or(Value::Text(text))
                }
                (_, other) => json_to_value(other),
            }
        }
        Json::Array(items) => Value::Text(Json::Array(items).to_string()),
    }
}
