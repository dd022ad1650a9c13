//! Minimal account prototype: bcrypt password hashes and opaque session
//! tokens stored alongside the submissions.

use crate::domain::{normalized_email_sql, validate_email, UserId};
use crate::error::EmailFormatIssue;
use crate::storage::{Statement, StatementExecutor, StorageError, Value};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const SESSION_TTL_DAYS: i64 = 30;
const TOKEN_BYTES: usize = 32;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("invalid email address")]
    InvalidEmail(EmailFormatIssue),
    #[error("first and last name are required")]
    MissingName,
    #[error("password must be at least 8 characters")]
    WeakPassword,
    #[error("an account already exists for this email")]
    AlreadyRegistered,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, AccountError>;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Account {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_verified: bool,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Registration {
    pub user_id: UserId,
    pub verification_token: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Session {
    pub account: Account,
    pub token: String,
    pub expires_at: i64,
}

pub struct Accounts<'a, E: StatementExecutor + ?Sized> {
    executor: &'a E,
    hash_cost: u32,
}

impl<'a, E: StatementExecutor + ?Sized> Accounts<'a, E> {
    pub fn new(executor: &'a E) -> Self {
        Self {
            executor,
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }

    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    pub fn register(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Registration> {
        let email = validate_email(email).map_err(AccountError::InvalidEmail)?;
        let (first_name, last_name) = (first_name.trim(), last_name.trim());
        if first_name.is_empty() || last_name.is_empty() {
            return Err(AccountError::MissingName);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AccountError::WeakPassword);
        }

        let password_hash = bcrypt::hash(password, self.hash_cost)?;
        let verification_token = random_token();
        let statement = Statement::with_params(
            format!(
                "INSERT INTO users (email, password_hash, first_name, last_name, verification_token)
                 SELECT ?1, ?2, ?3, ?4, ?5
                 WHERE NOT EXISTS (SELECT 1 FROM users WHERE {} = ?1)
                 RETURNING id;",
                normalized_email_sql("email")
            ),
            vec![
                Value::from(email.as_str()),
                Value::from(password_hash),
                Value::from(first_name),
                Value::from(last_name),
                Value::from(verification_token.as_str()),
            ],
        );
        let result = match self.executor.execute(&statement) {
            Ok(result) => result,
            Err(err) if err.is_uniqueness_violation() => {
                return Err(AccountError::AlreadyRegistered)
            }
            Err(err) => return Err(err.into()),
        };
        let Some(id) = result.first_value().and_then(Value::as_i64) else {
            return Err(AccountError::AlreadyRegistered);
        };
        info!(user_id = id, "account registered");
        Ok(Registration {
            user_id: UserId::new(id),
            verification_token,
        })
    }

    pub fn login(&self, email: &str, password: &str, now: DateTime<Utc>) -> Result<Session> {
        let email = validate_email(email).map_err(|_| AccountError::InvalidCredentials)?;
        let result = self.executor.execute(
            &Statement::new(format!(
                "SELECT id, email, first_name, last_name, is_verified, password_hash
                 FROM users WHERE {} = ?1 LIMIT 1;",
                normalized_email_sql("email")
            ))
            .bind(email),
        )?;
        let Some(row) = result.rows.first() else {
            return Err(AccountError::InvalidCredentials);
        };
        let account = account_from_row(row).ok_or(AccountError::InvalidCredentials)?;
        let hash = row
            .get(5)
            .and_then(Value::as_str)
            .ok_or(AccountError::InvalidCredentials)?;
        if !bcrypt::verify(password, hash)? {
            return Err(AccountError::InvalidCredentials);
        }

        let token = random_token();
        let expires_at = (now + Duration::days(SESSION_TTL_DAYS)).timestamp();
        self.executor.execute(
            &Statement::new(
                "INSERT INTO session_tokens (user_id, token, expires_at, created_at)
                 VALUES (?1, ?2, ?3, ?4);",
            )
            .bind(account.id.get())
            .bind(token.as_str())
            .bind(expires_at)
            .bind(now.timestamp()),
        )?;
        debug!(user_id = account.id.get(), token_len = token.len(), "session issued");
        Ok(Session {
            account,
            token,
            expires_at,
        })
    }

    pub fn user_by_token(&self, token: &str, now: DateTime<Utc>) -> Result<Option<Account>> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(None);
        }
        let result = self.executor.execute(
            &Statement::new(
                "SELECT u.id, u.email, u.first_name, u.last_name, u.is_verified
                 FROM users u
                 INNER JOIN session_tokens st ON st.user_id = u.id
                 WHERE st.token = ?1 AND st.expires_at > ?2
                 LIMIT 1;",
            )
            .bind(token)
            .bind(now.timestamp()),
        )?;
        Ok(result.rows.first().and_then(|row| account_from_row(row)))
    }
}

fn account_from_row(row: &[Value]) -> Option<Account> {
    Some(Account {
        id: UserId::new(row.first()?.as_i64()?),
        email: row.get(1)?.as_str()?.to_string(),
        first_name: row.get(2)?.as_str()?.to_string(),
        last_name: row.get(3)?.as_str()?.to_string(),
        is_verified: row.get(4).and_then(Value::as_i64).unwrap_or(0) != 0,
    })
}

fn random_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::random_token;

    #[test]
    fn tokens_are_hex_and_distinct() {
        let a = random_token();
        let b = random_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
