use formdesk_core::{Statement, StatementResult, Value};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, Transaction, TransactionBehavior};

/// Runs one statement. Writes issued outside a transaction take the write
/// lock up front (`BEGIN IMMEDIATE`) so a conditional insert reads the state
/// it is about to modify.
pub(crate) fn execute(conn: &Connection, statement: &Statement) -> rusqlite::Result<StatementResult> {
    let mut prepared = conn.prepare(&statement.sql)?;
    if prepared.readonly() || !conn.is_autocommit() {
        return run(conn, &mut prepared, statement);
    }
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let result = run(conn, &mut prepared, statement)?;
    tx.commit()?;
    Ok(result)
}

pub(crate) fn execute_batch(
    conn: &Connection,
    statements: &[Statement],
) -> rusqlite::Result<Vec<StatementResult>> {
    if !conn.is_autocommit() {
        return statements
            .iter()
            .map(|statement| execute(conn, statement))
            .collect();
    }
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let mut results = Vec::with_capacity(statements.len());
    for statement in statements {
        let mut prepared = conn.prepare(&statement.sql)?;
        results.push(run(conn, &mut prepared, statement)?);
    }
    tx.commit()?;
    Ok(results)
}

fn run(
    conn: &Connection,
    prepared: &mut rusqlite::Statement<'_>,
    statement: &Statement,
) -> rusqlite::Result<StatementResult> {
    let columns: Vec<String> = prepared
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    let readonly = prepared.readonly();
    let params = params_from_iter(statement.params.iter().map(to_sql));

    // A statement that yields rows (SELECT or `RETURNING`) reports one row
    // per changed record; otherwise the step itself reports the change count.
    let mut rows_out = Vec::new();
    let changed = if columns.is_empty() {
        prepared.execute(params)? as u64
    } else {
        let mut rows = prepared.query(params)?;
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for index in 0..columns.len() {
                values.push(from_sql(row.get_ref(index)?));
            }
            rows_out.push(values);
        }
        rows_out.len() as u64
    };

    let rows_affected = if readonly { 0 } else { changed };
    let last_insert_id = if rows_affected > 0 {
        Some(conn.last_insert_rowid())
    } else {
        None
    };
    Ok(StatementResult {
        columns,
        rows: rows_out,
        rows_affected,
        last_insert_id,
    })
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(value) => SqlValue::Integer(*value),
        Value::Real(value) => SqlValue::Real(*value),
        Value::Text(value) => SqlValue::Text(value.clone()),
    }
}

fn from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(value) => Value::Integer(value),
        ValueRef::Real(value) => Value::Real(value),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}
