pub mod email;
pub mod ids;
pub mod kind;

pub use email::{normalize_email, normalized_email_sql, validate_email};
pub use ids::{RecordId, UserId};
pub use kind::{SubmissionKind, UnknownKind};
