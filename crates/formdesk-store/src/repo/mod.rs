pub mod maintenance;
pub mod submissions;

pub use maintenance::{dedupe_membership_emails, DedupeGroup, DedupePlan};
pub use submissions::{SubmissionRow, SubmissionsRepo};
