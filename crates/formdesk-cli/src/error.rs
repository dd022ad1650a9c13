use anyhow::Error;
use formdesk_config::ConfigError;
use formdesk_core::accounts::AccountError;
use formdesk_core::{ErrorCode, StorageError, SubmissionError};
use formdesk_remote::{RemoteError, RemoteErrorKind};
use formdesk_store::error::{StoreError, StoreErrorKind};
use std::process::ExitCode;
use thiserror::Error as ThisError;

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_NOT_FOUND: u8 = 2;
pub const EXIT_INVALID_INPUT: u8 = 3;
pub const EXIT_DUPLICATE: u8 = 4;
pub const EXIT_UNAVAILABLE: u8 = 5;

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("{message}")]
    Refused { code: ErrorCode, message: String },
    #[error("schema drift detected in {0} table(s)")]
    SchemaDrift(usize),
}

pub fn invalid_input(message: impl Into<String>) -> Error {
    CliError::InvalidInput(message.into()).into()
}

pub fn not_found(message: impl Into<String>) -> Error {
    CliError::NotFound(message.into()).into()
}

pub fn report_error(err: &Error, verbose: bool) {
    if verbose {
        eprintln!("error: {:#}", err);
    } else {
        eprintln!("error: {}", err);
    }
}

pub fn exit_code_for(err: &Error) -> ExitCode {
    for cause in err.chain() {
        if let Some(cli_err) = cause.downcast_ref::<CliError>() {
            return ExitCode::from(match cli_err {
                CliError::InvalidInput(_) => EXIT_INVALID_INPUT,
                CliError::NotFound(_) => EXIT_NOT_FOUND,
                CliError::Refused { code, .. } => error_code_exit(*code),
                CliError::SchemaDrift(_) => EXIT_FAILURE,
            });
        }
        if let Some(submission_err) = cause.downcast_ref::<SubmissionError>() {
            return ExitCode::from(error_code_exit(submission_err.code()));
        }
        if let Some(account_err) = cause.downcast_ref::<AccountError>() {
            return ExitCode::from(account_exit_code(account_err));
        }
        if let Some(storage_err) = cause.downcast_ref::<StorageError>() {
            return ExitCode::from(storage_exit_code(storage_err));
        }
        if let Some(store_err) = cause.downcast_ref::<StoreError>() {
            return ExitCode::from(store_exit_code(store_err));
        }
        if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
            return ExitCode::from(config_exit_code(config_err));
        }
        if let Some(remote_err) = cause.downcast_ref::<RemoteError>() {
            return ExitCode::from(remote_exit_code(remote_err));
        }
    }
    ExitCode::from(EXIT_FAILURE)
}

fn error_code_exit(code: ErrorCode) -> u8 {
    match code {
        ErrorCode::DuplicateEmail => EXIT_DUPLICATE,
        ErrorCode::StorageUnavailable => EXIT_UNAVAILABLE,
        ErrorCode::StorageRejected => EXIT_FAILURE,
        ErrorCode::InvalidEmailFormat
        | ErrorCode::MissingRequiredField
        | ErrorCode::InvalidFieldValue
        | ErrorCode::UnmappedField => EXIT_INVALID_INPUT,
    }
}

fn account_exit_code(err: &AccountError) -> u8 {
    match err {
        AccountError::AlreadyRegistered => EXIT_DUPLICATE,
        AccountError::InvalidEmail(_)
        | AccountError::MissingName
        | AccountError::WeakPassword
        | AccountError::InvalidCredentials => EXIT_INVALID_INPUT,
        AccountError::Hash(_) => EXIT_FAILURE,
        AccountError::Storage(storage_err) => storage_exit_code(storage_err),
    }
}

fn storage_exit_code(err: &StorageError) -> u8 {
    match err {
        StorageError::Unavailable(_) => EXIT_UNAVAILABLE,
        StorageError::Rejected(_) => EXIT_FAILURE,
    }
}

fn store_exit_code(err: &StoreError) -> u8 {
    match err.kind() {
        StoreErrorKind::SnapshotNotFound => EXIT_NOT_FOUND,
        StoreErrorKind::InvalidBackupPath | StoreErrorKind::InvalidDataPath => EXIT_INVALID_INPUT,
        StoreErrorKind::Storage => match err {
            StoreError::Storage(storage_err) => storage_exit_code(storage_err),
            _ => EXIT_FAILURE,
        },
        StoreErrorKind::MissingHomeDir
        | StoreErrorKind::Migration
        | StoreErrorKind::Sql
        | StoreErrorKind::Io => EXIT_FAILURE,
    }
}

fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::MissingHomeDir => EXIT_FAILURE,
        ConfigError::InvalidConfigPath(_)
        | ConfigError::MissingConfigFile(_)
        | ConfigError::InsecurePermissions(_)
        | ConfigError::InvalidLanguage(_)
        | ConfigError::MissingRemote
        | ConfigError::MissingRemoteUrl
        | ConfigError::InvalidRemoteUrl(_)
        | ConfigError::MissingRemoteToken
        | ConfigError::MissingTokenEnv(_)
        | ConfigError::InvalidTimeout { .. }
        | ConfigError::Read { .. }
        | ConfigError::Parse { .. } => EXIT_INVALID_INPUT,
    }
}

fn remote_exit_code(err: &RemoteError) -> u8 {
    match err.kind() {
        RemoteErrorKind::Url | RemoteErrorKind::InsecureUrl | RemoteErrorKind::MissingToken => {
            EXIT_INVALID_INPUT
        }
        RemoteErrorKind::Http => EXIT_FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_of(err: Error) -> ExitCode {
        exit_code_for(&err)
    }

    #[test]
    fn submission_errors_map_to_distinct_exit_codes() {
        let duplicate = SubmissionError::DuplicateEmail {
            email: "a@example.com".to_string(),
        };
        assert_eq!(code_of(duplicate.into()), ExitCode::from(EXIT_DUPLICATE));

        let unavailable = SubmissionError::StorageUnavailable("busy".to_string());
        assert_eq!(code_of(unavailable.into()), ExitCode::from(EXIT_UNAVAILABLE));

        let missing = SubmissionError::MissingRequiredField {
            field: "email".to_string(),
        };
        assert_eq!(code_of(missing.into()), ExitCode::from(EXIT_INVALID_INPUT));
    }

    #[test]
    fn context_does_not_hide_cause() {
        let err = Error::from(CliError::NotFound("token".to_string())).context("resolve session");
        assert_eq!(code_of(err), ExitCode::from(EXIT_NOT_FOUND));
    }
}
