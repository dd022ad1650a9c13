pub mod accounts;
pub mod domain;
pub mod dto;
pub mod error;
pub mod mapping;
pub mod messages;
pub mod normalize;
pub mod storage;
pub mod submit;

pub use domain::*;
pub use dto::{FormMappingDto, SubmissionOutcome};
pub use error::{ErrorCode, SubmissionError};
pub use messages::Language;
pub use normalize::{normalize, FieldValue, FormInput, NormalizedRecord};
pub use storage::{Statement, StatementExecutor, StatementResult, StorageError, Value};
pub use submit::Submitter;
