use formdesk_core::mapping::{self, drift::verify_mapping, MAPPING_SCHEMA_VERSION};
use formdesk_core::SubmissionKind;
use formdesk_store::error::StoreError;
use formdesk_store::migrate::{latest_version, MIGRATIONS};
use formdesk_store::Store;

#[test]
fn migrations_apply_once() {
    let store = Store::open_in_memory().expect("open in memory");
    assert_eq!(store.schema_version().expect("version before"), 0);
    store.migrate().expect("migrate");
    store.migrate().expect("migrate again");

    assert_eq!(store.schema_version().expect("schema version"), latest_version());
    assert_eq!(latest_version(), MIGRATIONS.len() as i64);
    assert_eq!(latest_version(), MAPPING_SCHEMA_VERSION);
}

#[test]
fn mapping_tables_match_migrated_schema() {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");

    for kind in SubmissionKind::ALL {
        let report = verify_mapping(&store, mapping::for_kind(kind)).expect("verify");
        assert!(report.is_clean(), "{:?}", report);
    }

    let membership =
        verify_mapping(&store, mapping::for_kind(SubmissionKind::Membership)).expect("verify");
    assert!(membership.unfed_columns.contains(&"phone_number".to_string()));
    assert!(membership.unfed_columns.contains(&"country".to_string()));
}

#[test]
fn legacy_duplicates_block_unique_index_until_deduped() {
    let store = Store::open_in_memory().expect("open in memory");
    store
        .connection()
        .execute_batch(MIGRATIONS[0].1)
        .expect("apply base schema");
    store
        .connection()
        .execute_batch(
            "CREATE TABLE formdesk_schema (version INTEGER NOT NULL);
             INSERT INTO formdesk_schema (version) VALUES (1);
             INSERT INTO membership_applications (first_name, email, institution)
               VALUES ('A', 'old@example.com', 'X');
             INSERT INTO membership_applications (first_name, email, institution)
               VALUES ('B', ' OLD@example.com', 'Y');
             INSERT INTO membership_applications (first_name, email, institution)
               VALUES ('C', 'other@example.com', 'Z');",
        )
        .expect("seed legacy rows");

    let err = store.migrate().expect_err("unique index fails");
    assert!(matches!(err, StoreError::Migration(_)));
    assert_eq!(store.schema_version().expect("version"), 1);

    let dry_run = store.dedupe_membership_emails(false).expect("plan");
    assert!(!dry_run.applied);
    assert_eq!(dry_run.groups.len(), 1);
    assert_eq!(dry_run.groups[0].email, "old@example.com");
    assert_eq!(dry_run.groups[0].keep, 1);
    assert_eq!(dry_run.groups[0].remove, vec![2]);

    let applied = store.dedupe_membership_emails(true).expect("apply");
    assert!(applied.applied);
    assert_eq!(applied.removed_count(), 1);

    store.migrate().expect("migrate after dedupe");
    assert_eq!(store.schema_version().expect("version"), latest_version());
    assert!(store
        .dedupe_membership_emails(false)
        .expect("clean plan")
        .is_empty());
}
