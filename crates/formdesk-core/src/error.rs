use crate::storage::StorageError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailFormatIssue {
    ContainsWhitespace,
    Malformed,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("invalid email in field {field}")]
    InvalidEmailFormat {
        field: String,
        issue: EmailFormatIssue,
    },
    #[error("duplicate email: {email}")]
    DuplicateEmail { email: String },
    #[error("missing required field: {field}")]
    MissingRequiredField { field: String },
    #[error("invalid value for field {field}")]
    InvalidFieldValue { field: String },
    #[error("field has no destination column: {field}")]
    UnmappedField { field: String },
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("storage rejected statement: {0}")]
    StorageRejected(String),
}

pub type Result<T> = std::result::Result<T, SubmissionError>;

/// Machine-readable error codes exposed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidEmailFormat,
    DuplicateEmail,
    MissingRequiredField,
    InvalidFieldValue,
    UnmappedField,
    StorageUnavailable,
    StorageRejected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidEmailFormat => "invalid_email_format",
            ErrorCode::DuplicateEmail => "duplicate_email",
            ErrorCode::MissingRequiredField => "missing_required_field",
            ErrorCode::InvalidFieldValue => "invalid_field_value",
            ErrorCode::UnmappedField => "unmapped_field",
            ErrorCode::StorageUnavailable => "storage_unavailable",
            ErrorCode::StorageRejected => "storage_rejected",
        }
    }

    /// Transient failures the caller may retry unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCode::StorageUnavailable)
    }
}

impl SubmissionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SubmissionError::InvalidEmailFormat { .. } => ErrorCode::InvalidEmailFormat,
            SubmissionError::DuplicateEmail { .. } => ErrorCode::DuplicateEmail,
            SubmissionError::MissingRequiredField { .. } => ErrorCode::MissingRequiredField,
            SubmissionError::InvalidFieldValue { .. } => ErrorCode::InvalidFieldValue,
            SubmissionError::UnmappedField { .. } => ErrorCode::UnmappedField,
            SubmissionError::StorageUnavailable(_) => ErrorCode::StorageUnavailable,
            SubmissionError::StorageRejected(_) => ErrorCode::StorageRejected,
        }
    }

    pub fn invalid_email(field: &str, issue: EmailFormatIssue) -> Self {
        SubmissionError::InvalidEmailFormat {
            field: field.to_string(),
            issue,
        }
    }
}

impl From<StorageError> for SubmissionError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unavailable(message) => SubmissionError::StorageUnavailable(message),
            StorageError::Rejected(message) => SubmissionError::StorageRejected(message),
        }
    }
}
