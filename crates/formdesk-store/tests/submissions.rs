use formdesk_core::accounts::Accounts;
use formdesk_core::error::{ErrorCode, SubmissionError};
use formdesk_core::{
    normalize, FormInput, StatementExecutor, SubmissionKind, Submitter, UserId, Value,
};
use formdesk_store::Store;
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;

fn membership(email: &str) -> FormInput {
    FormInput::new()
        .with("email", email)
        .with("full_name", "Layla Hassan Omar")
        .with("current_institution", "Cairo University")
        .with("experience_years", "7")
}

fn migrated() -> Store {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");
    store
}

#[test]
fn membership_duplicate_is_case_and_space_insensitive() {
    let store = migrated();
    let submitter = Submitter::new(&store);

    let first = normalize(SubmissionKind::Membership, &membership("Test@Example.com"))
        .expect("normalize first");
    let id = submitter.submit(&first).expect("first submit");
    assert!(id.get() > 0);

    let second = normalize(SubmissionKind::Membership, &membership("  test@example.com "))
        .expect("normalize second");
    let err = submitter.submit(&second).expect_err("duplicate");
    assert_eq!(
        err,
        SubmissionError::DuplicateEmail {
            email: "test@example.com".to_string()
        }
    );
    assert_eq!(store.submissions().count(SubmissionKind::Membership).expect("count"), 1);
}

#[test]
fn unknown_owner_is_a_storage_rejection_not_a_duplicate() {
    let store = migrated();
    let submitter = Submitter::new(&store);
    let outcome = submitter.submit_form(
        SubmissionKind::Membership,
        &membership("fresh@example.com"),
        Some(UserId::new(999)),
    );
    assert!(!outcome.success);
    assert_eq!(outcome.error_code, Some(ErrorCode::StorageRejected));
    assert!(!submitter
        .check_email_exists(SubmissionKind::Membership, "fresh@example.com")
        .expect("check"));
}

#[test]
fn stored_membership_row_holds_normalized_values() {
    let store = migrated();
    let owner = Accounts::new(&store)
        .with_hash_cost(4)
        .register("owner@example.org", "correct horse", "Ada", "Owner")
        .expect("register")
        .user_id;
    let outcome = Submitter::new(&store).submit_form(
        SubmissionKind::Membership,
        &membership(" Ada@Example.ORG "),
        Some(owner),
    );
    assert!(outcome.success, "{:?}", outcome);

    let rows = store
        .submissions()
        .list_recent(SubmissionKind::Membership, 10)
        .expect("list");
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(Some(row.id), outcome.id);
    assert_eq!(row.owner, Some(owner.get()));
    assert!(row.submitted_at.is_some());
    assert_eq!(row.get("email"), Some(&Value::from("ada@example.org")));
    assert_eq!(row.get("first_name"), Some(&Value::from("Layla")));
    assert_eq!(row.get("last_name"), Some(&Value::from("Hassan Omar")));
    assert_eq!(row.get("years_of_experience"), Some(&Value::Integer(7)));
    assert_eq!(row.get("position"), Some(&Value::from("")));

    let status = store
        .connection()
        .query_row(
            "SELECT status FROM membership_applications WHERE id = ?1;",
            [row.id.get()],
            |r| r.get::<_, String>(0),
        )
        .expect("status");
    assert_eq!(status, "Pending");
}

#[test]
fn suggestion_fields_land_in_renamed_columns() {
    let store = migrated();
    let input = FormInput::new()
        .with("name", "Omar Khalid")
        .with("email", "omar@example.com")
        .with("category", "Website")
        .with("subject", "Dark mode")
        .with("suggestion", "Please add a dark theme.")
        .with("priority", "low")
        .with("contact_back", true)
        .with("additional_info", "Thanks");
    let outcome = Submitter::new(&store).submit_form(SubmissionKind::Suggestion, &input, None);
    assert!(outcome.success);

    let (title, description, priority, contact_back, comments): (String, String, String, i64, String) =
        store
            .connection()
            .query_row(
                "SELECT suggestion_title, suggestion_description, priority_level, contact_back, additional_comments
                 FROM general_suggestions;",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)),
            )
            .expect("row");
    assert_eq!(title, "Dark mode");
    assert_eq!(description, "Please add a dark theme.");
    assert_eq!(priority, "low");
    assert_eq!(contact_back, 1);
    assert_eq!(comments, "Thanks");
}

#[test]
fn unguarded_kinds_accept_repeated_emails() {
    let store = migrated();
    let submitter = Submitter::new(&store);
    let input = FormInput::new()
        .with("email", "repeat@example.com")
        .with("submitter_name", "Nour")
        .with("project_title", "Solar kiosks")
        .with("project_nature", "Applied")
        .with("project_type", "Startup")
        .with("brief_description", "Off-grid charging.");

    let first = submitter.submit_form(SubmissionKind::BankOfIdeas, &input, None);
    let second = submitter.submit_form(SubmissionKind::BankOfIdeas, &input, None);
    assert!(first.success && second.success);
    assert_ne!(first.id, second.id);

    let web_links: Option<String> = store
        .connection()
        .query_row("SELECT web_links FROM bank_of_ideas LIMIT 1;", [], |r| r.get(0))
        .expect("web links");
    assert_eq!(web_links, None);
}

#[test]
fn check_email_exists_matches_normalized_email() {
    let store = migrated();
    let submitter = Submitter::new(&store);
    assert!(!submitter
        .check_email_exists(SubmissionKind::Membership, "x@example.com")
        .expect("probe"));

    let outcome = submitter.submit_form(SubmissionKind::Membership, &membership("X@Example.com"), None);
    assert!(outcome.success);
    assert!(submitter
        .check_email_exists(SubmissionKind::Membership, " x@EXAMPLE.com")
        .expect("probe"));

    let err = submitter
        .check_email_exists(SubmissionKind::Membership, "not an email")
        .expect_err("malformed");
    assert!(matches!(err, SubmissionError::InvalidEmailFormat { .. }));
}

#[test]
fn unique_index_backs_the_guard() {
    let store = migrated();
    Submitter::new(&store)
        .submit_form(SubmissionKind::Membership, &membership("dup@example.com"), None);

    let err = store
        .execute(
            &formdesk_core::Statement::new(
                "INSERT INTO membership_applications (first_name, email, institution) VALUES ('A', ' DUP@example.com', 'X');",
            ),
        )
        .expect_err("unique index");
    assert!(err.is_uniqueness_violation(), "{}", err);
}

#[test]
fn concurrent_duplicate_submissions_store_one_row() {
    const WRITERS: usize = 8;
    let temp = TempDir::new().expect("temp dir");
    let db_path = temp.path().join("forms.sqlite3");
    Store::open(&db_path)
        .expect("open store")
        .migrate()
        .expect("migrate");

    let barrier = Arc::new(Barrier::new(WRITERS));
    let handles: Vec<_> = (0..WRITERS)
        .map(|index| {
            let barrier = Arc::clone(&barrier);
            let db_path = db_path.clone();
            thread::spawn(move || {
                let store = Store::open(&db_path).expect("open store");
                let email = if index % 2 == 0 {
                    "Race@Example.com"
                } else {
                    " race@example.com"
                };
                let record =
                    normalize(SubmissionKind::Membership, &membership(email)).expect("normalize");
                barrier.wait();
                Submitter::new(&store).submit(&record)
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("join"))
        .collect();
    let successes = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(successes, 1, "{:?}", results);
    for result in results.iter().filter(|result| result.is_err()) {
        assert!(matches!(
            result,
            Err(SubmissionError::DuplicateEmail { .. })
        ));
    }

    let store = Store::open(&db_path).expect("reopen");
    assert_eq!(store.submissions().count(SubmissionKind::Membership).expect("count"), 1);
}

#[test]
fn legacy_email_padded_with_tabs_counts_as_taken() {
    let store = migrated();
    store
        .connection()
        .execute_batch(
            "INSERT INTO membership_applications (first_name, email, institution)
               VALUES ('A', char(9) || 'Pad@Example.com' || char(13, 10), 'X');",
        )
        .expect("seed padded row");

    let submitter = Submitter::new(&store);
    assert!(submitter
        .check_email_exists(SubmissionKind::Membership, "pad@example.com")
        .expect("check"));
    let outcome = submitter.submit_form(
        SubmissionKind::Membership,
        &membership("PAD@example.com"),
        None,
    );
    assert_eq!(outcome.error_code, Some(ErrorCode::DuplicateEmail));

    let plan = store.dedupe_membership_emails(false).expect("plan");
    assert!(plan.is_empty());
}
