use chrono::{Duration, TimeZone, Utc};
use formdesk_core::accounts::{AccountError, Accounts};
use formdesk_store::Store;

fn migrated() -> Store {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");
    store
}

#[test]
fn register_login_and_resolve_token() {
    let store = migrated();
    let accounts = Accounts::new(&store).with_hash_cost(4);
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single().expect("time");

    let registration = accounts
        .register("Mona@Example.com", "correct horse", "Mona", "Saleh")
        .expect("register");
    assert_eq!(registration.verification_token.len(), 64);

    let err = accounts
        .register(" mona@example.com", "another pass", "Mona", "Saleh")
        .expect_err("duplicate");
    assert!(matches!(err, AccountError::AlreadyRegistered));

    let err = accounts
        .login("mona@example.com", "wrong password", now)
        .expect_err("bad password");
    assert!(matches!(err, AccountError::InvalidCredentials));

    let session = accounts
        .login("MONA@example.com", "correct horse", now)
        .expect("login");
    assert_eq!(session.account.id, registration.user_id);
    assert_eq!(session.account.email, "mona@example.com");
    assert_eq!(session.expires_at, (now + Duration::days(30)).timestamp());

    let account = accounts
        .user_by_token(&session.token, now + Duration::days(1))
        .expect("lookup")
        .expect("valid token");
    assert_eq!(account.first_name, "Mona");

    let expired = accounts
        .user_by_token(&session.token, now + Duration::days(31))
        .expect("lookup");
    assert!(expired.is_none());
}

#[test]
fn register_rejects_short_password() {
    let store = migrated();
    let err = Accounts::new(&store)
        .with_hash_cost(4)
        .register("a@example.com", "short", "A", "B")
        .expect_err("weak");
    assert!(matches!(err, AccountError::WeakPassword));
}
