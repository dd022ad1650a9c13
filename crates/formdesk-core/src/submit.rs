use crate::domain::{normalized_email_sql, validate_email, RecordId, SubmissionKind, UserId};
use crate::dto::SubmissionOutcome;
use crate::error::{Result, SubmissionError};
use crate::mapping;
use crate::normalize::{normalize, FormInput, NormalizedRecord};
use crate::storage::{Statement, StatementExecutor, StorageError, Value};
use tracing::{debug, info, warn};

/// Inserts normalized records, enforcing the per-email uniqueness of guarded
/// kinds with a single conditional statement.
pub struct Submitter<'a, E: StatementExecutor + ?Sized> {
    executor: &'a E,
}

impl<'a, E: StatementExecutor + ?Sized> Submitter<'a, E> {
    pub fn new(executor: &'a E) -> Self {
        Self { executor }
    }

    pub fn submit(&self, record: &NormalizedRecord) -> Result<RecordId> {
        let mapping = record.mapping();
        let guard_email = record.guard_email();
        let statement = insert_statement(record);
        debug!(kind = %mapping.kind, table = mapping.table, "inserting submission");

        let result = match self.executor.execute(&statement) {
            Ok(result) => result,
            Err(err) => return Err(classify_storage_error(err, guard_email)),
        };

        let returned = result.first_value().and_then(Value::as_i64);
        let inserted = returned.or(if result.rows_affected > 0 {
            result.last_insert_id
        } else {
            None
        });

        match (inserted, guard_email) {
            (Some(id), _) if id > 0 => {
                info!(kind = %mapping.kind, id, "submission stored");
                Ok(RecordId::new(id))
            }
            (_, Some(email)) => {
                warn!(kind = %mapping.kind, email, "duplicate email rejected");
                Err(SubmissionError::DuplicateEmail {
                    email: email.to_string(),
                })
            }
            (_, None) => Err(SubmissionError::StorageRejected(
                "insert returned no identifier".to_string(),
            )),
        }
    }

    /// Normalizes then submits, folding every failure into the outcome object.
    pub fn submit_form(
        &self,
        kind: SubmissionKind,
        input: &FormInput,
        owner: Option<UserId>,
    ) -> SubmissionOutcome {
        let result = normalize(kind, input)
            .map(|record| record.with_owner(owner))
            .and_then(|record| self.submit(&record));
        if let Err(err) = &result {
            debug!(kind = %kind, code = err.code().as_str(), "submission refused");
        }
        SubmissionOutcome::from(result)
    }

    /// Whether a row with the same normalized email already exists for `kind`.
    ///
    /// Kinds without an email column never report a match.
    pub fn check_email_exists(&self, kind: SubmissionKind, email: &str) -> Result<bool> {
        let mapping = mapping::for_kind(kind);
        let Some(column) = mapping.email_column else {
            return Ok(false);
        };
        let email = validate_email(email)
            .map_err(|issue| SubmissionError::invalid_email(column, issue))?;
        let result = self.executor.execute(
            &Statement::new(format!(
                "SELECT 1 FROM {} WHERE {} = ?1 LIMIT 1;",
                mapping.table,
                normalized_email_sql(column)
            ))
            .bind(email),
        )?;
        Ok(!result.is_empty())
    }
}

/// Builds the insert for `record`. Guarded kinds get an
/// `INSERT .. SELECT .. WHERE NOT EXISTS` so the check and the write are one
/// statement; the store returns no row when the email is already taken.
pub fn insert_statement(record: &NormalizedRecord) -> Statement {
    let mapping = record.mapping();
    let mut columns: Vec<&str> = vec![mapping.owner_column];
    let mut params: Vec<Value> = vec![record.owner().map(|id| id.get()).into()];
    for (column, value) in record.columns() {
        columns.push(*column);
        params.push(value.clone());
    }
    let placeholders = (1..=params.len())
        .map(|index| format!("?{}", index))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = match (mapping.guard_column(), record.guard_email()) {
        (Some(column), Some(email)) => {
            params.push(Value::Text(email.to_string()));
            format!(
                "INSERT INTO {table} ({columns}) SELECT {placeholders} \
                 WHERE NOT EXISTS (SELECT 1 FROM {table} WHERE {normalized} = ?{key}) \
                 RETURNING id;",
                table = mapping.table,
                columns = columns.join(", "),
                placeholders = placeholders,
                normalized = normalized_email_sql(column),
                key = params.len(),
            )
        }
        _ => format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING id;",
            mapping.table,
            columns.join(", "),
            placeholders
        ),
    };
    Statement::with_params(sql, params)
}

fn classify_storage_error(err: StorageError, guard_email: Option<&str>) -> SubmissionError {
    match guard_email {
        Some(email) if err.is_uniqueness_violation() => {
            warn!(email, error = %err, "store reported uniqueness violation");
            SubmissionError::DuplicateEmail {
                email: email.to_string(),
            }
        }
        _ => SubmissionError::from(err),
    }
}

#[cfg(test)]
mod tests {
    use super::{insert_statement, Submitter};
    use crate::domain::{RecordId, SubmissionKind, UserId};
    use crate::error::{ErrorCode, SubmissionError};
    use crate::normalize::{normalize, FormInput};
    use crate::storage::{Statement, StatementExecutor, StatementResult, StorageError, Value};
    use std::cell::RefCell;

    struct Scripted {
        replies: RefCell<Vec<Result<StatementResult, StorageError>>>,
        seen: RefCell<Vec<Statement>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<StatementResult, StorageError>>) -> Self {
            Self {
                replies: RefCell::new(replies),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl StatementExecutor for Scripted {
        fn execute(&self, statement: &Statement) -> Result<StatementResult, StorageError> {
            self.seen.borrow_mut().push(statement.clone());
            self.replies.borrow_mut().remove(0)
        }
    }

    fn returned_id(id: i64) -> StatementResult {
        StatementResult {
            columns: vec!["id".to_string()],
            rows: vec![vec![Value::Integer(id)]],
            rows_affected: 1,
            last_insert_id: Some(id),
        }
    }

    fn membership() -> FormInput {
        FormInput::new()
            .with("email", "  Test@Example.com ")
            .with("full_name", "Test User")
            .with("current_institution", "Institute")
    }

    #[test]
    fn guarded_insert_is_a_single_conditional_statement() {
        let record = normalize(SubmissionKind::Membership, &membership())
            .expect("normalize")
            .with_owner(Some(UserId::new(3)));
        let statement = insert_statement(&record);
        assert!(statement.sql.starts_with("INSERT INTO membership_applications (user_id, email,"));
        assert!(statement.sql.contains("WHERE NOT EXISTS"));
        assert!(statement.sql.contains("LOWER(TRIM(email, char(32, 9, 10, 11, 12, 13)))"));
        assert_eq!(statement.params.first(), Some(&Value::Integer(3)));
        assert_eq!(
            statement.params.last(),
            Some(&Value::Text("test@example.com".to_string()))
        );
    }

    #[test]
    fn plain_insert_has_no_guard() {
        let input = FormInput::new()
            .with("name", "Hind")
            .with("email", "hind@example.org")
            .with("category", "General")
            .with("subject", "Hello")
            .with("suggestion", "More events");
        let record = normalize(SubmissionKind::Suggestion, &input).expect("normalize");
        let statement = insert_statement(&record);
        assert!(statement.sql.contains("VALUES ("));
        assert!(!statement.sql.contains("NOT EXISTS"));
        assert_eq!(statement.params.first(), Some(&Value::Null));
    }

    #[test]
    fn empty_returning_means_duplicate_for_guarded_kind() {
        let store = Scripted::new(vec![Ok(StatementResult::default())]);
        let record = normalize(SubmissionKind::Membership, &membership()).expect("normalize");
        let err = Submitter::new(&store).submit(&record).unwrap_err();
        assert_eq!(
            err,
            SubmissionError::DuplicateEmail {
                email: "test@example.com".to_string()
            }
        );
    }

    #[test]
    fn unique_constraint_failure_is_reclassified() {
        let store = Scripted::new(vec![Err(StorageError::Rejected(
            "SQLite error: UNIQUE constraint failed: membership_applications.email".to_string(),
        ))]);
        let record = normalize(SubmissionKind::Membership, &membership()).expect("normalize");
        let err = Submitter::new(&store).submit(&record).unwrap_err();
        assert_eq!(err.code(), ErrorCode::DuplicateEmail);
    }

    #[test]
    fn other_constraint_failures_stay_rejected() {
        for message in [
            "FOREIGN KEY constraint failed",
            "NOT NULL constraint failed: membership_applications.first_name",
            "no such table: membership_applications",
        ] {
            let store = Scripted::new(vec![Err(StorageError::Rejected(message.to_string()))]);
            let outcome = Submitter::new(&store).submit_form(
                SubmissionKind::Membership,
                &membership(),
                Some(UserId::new(999)),
            );
            assert!(!outcome.success);
            assert_eq!(
                outcome.error_code,
                Some(ErrorCode::StorageRejected),
                "{}",
                message
            );
        }
    }

    #[test]
    fn transport_failure_is_unavailable() {
        let store = Scripted::new(vec![Err(StorageError::Unavailable(
            "operation timed out".to_string(),
        ))]);
        let outcome =
            Submitter::new(&store).submit_form(SubmissionKind::Membership, &membership(), None);
        assert!(!outcome.success);
        assert_eq!(outcome.error_code, Some(ErrorCode::StorageUnavailable));
    }

    #[test]
    fn invalid_email_never_reaches_the_store() {
        let store = Scripted::new(Vec::new());
        let input = membership().with("email", "a b@example.com");
        let outcome = Submitter::new(&store).submit_form(SubmissionKind::Membership, &input, None);
        assert_eq!(outcome.error_code, Some(ErrorCode::InvalidEmailFormat));
        assert!(store.seen.borrow().is_empty());
    }

    #[test]
    fn falls_back_to_last_insert_id() {
        let store = Scripted::new(vec![Ok(StatementResult {
            rows_affected: 1,
            last_insert_id: Some(41),
            ..StatementResult::default()
        })]);
        let record = normalize(SubmissionKind::Membership, &membership()).expect("normalize");
        let id = Submitter::new(&store).submit(&record).expect("submit");
        assert_eq!(id, RecordId::new(41));
    }

    #[test]
    fn accepted_submission_returns_generated_id() {
        let store = Scripted::new(vec![Ok(returned_id(9))]);
        let outcome =
            Submitter::new(&store).submit_form(SubmissionKind::Membership, &membership(), None);
        assert!(outcome.success);
        assert_eq!(outcome.id, Some(RecordId::new(9)));
    }

    #[test]
    fn check_email_exists_queries_normalized_value() {
        let store = Scripted::new(vec![Ok(returned_id(1))]);
        let exists = Submitter::new(&store)
            .check_email_exists(SubmissionKind::Membership, " TEST@example.com")
            .expect("check");
        assert!(exists);
        let seen = store.seen.borrow();
        assert_eq!(
            seen[0].params,
            vec![Value::Text("test@example.com".to_string())]
        );
    }
}
