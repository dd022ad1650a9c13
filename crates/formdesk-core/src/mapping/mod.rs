//! Declarative form-to-column mapping tables.
//!
//! UI field names and storage column names evolve independently. Every field a
//! form may send is listed here explicitly; anything else is refused by the
//! normalizer instead of being dropped on insert.

pub mod drift;
mod tables;

use crate::domain::SubmissionKind;

/// Schema version the tables below were written against.
pub const MAPPING_SCHEMA_VERSION: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Text,
    /// Trimmed, lower-cased and validated.
    Email,
    Integer,
    /// Checkbox-style value stored as 0 or 1.
    Flag,
    /// First whitespace-separated word of a full name.
    FirstName,
    /// Remainder of a full name after the first word.
    LastName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Empty,
    Zero,
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional(DefaultValue),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: &'static str,
    pub column: &'static str,
    pub presence: Presence,
    pub transform: Transform,
}

impl FieldSpec {
    pub const fn required(field: &'static str, column: &'static str, transform: Transform) -> Self {
        Self {
            field,
            column,
            presence: Presence::Required,
            transform,
        }
    }

    pub const fn optional(field: &'static str, column: &'static str, transform: Transform) -> Self {
        Self {
            field,
            column,
            presence: Presence::Optional(DefaultValue::Empty),
            transform,
        }
    }

    pub const fn with_default(mut self, default: DefaultValue) -> Self {
        self.presence = Presence::Optional(default);
        self
    }

    pub fn is_required(&self) -> bool {
        matches!(self.presence, Presence::Required)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FormMapping {
    pub kind: SubmissionKind,
    pub table: &'static str,
    /// Column receiving the signed-in submitter's user id, if any.
    pub owner_column: &'static str,
    /// Column holding the submitter's email, used for availability lookups.
    pub email_column: Option<&'static str>,
    /// Whether at most one row may exist per normalized email.
    pub unique_email: bool,
    pub schema_version: i64,
    pub fields: &'static [FieldSpec],
}

impl FormMapping {
    pub fn accepts_field(&self, field: &str) -> bool {
        self.fields.iter().any(|spec| spec.field == field)
    }

    /// Destination columns in insertion order, without duplicates.
    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns: Vec<&'static str> = Vec::with_capacity(self.fields.len() + 1);
        for spec in self.fields {
            if !columns.contains(&spec.column) {
                columns.push(spec.column);
            }
        }
        columns
    }

    pub fn guard_column(&self) -> Option<&'static str> {
        if self.unique_email {
            self.email_column
        } else {
            None
        }
    }
}

pub fn for_kind(kind: SubmissionKind) -> &'static FormMapping {
    match kind {
        SubmissionKind::Membership => &tables::MEMBERSHIP,
        SubmissionKind::Research => &tables::RESEARCH,
        SubmissionKind::Nomination => &tables::NOMINATION,
        SubmissionKind::Suggestion => &tables::SUGGESTION,
        SubmissionKind::BankOfIdeas => &tables::BANK_OF_IDEAS,
    }
}

#[cfg(test)]
mod tests {
    use super::{for_kind, Transform};
    use crate::domain::SubmissionKind;
    use std::collections::HashSet;

    #[test]
    fn only_membership_is_guarded() {
        for kind in SubmissionKind::ALL {
            let mapping = for_kind(kind);
            assert_eq!(mapping.kind, kind);
            assert_eq!(
                mapping.guard_column().is_some(),
                kind == SubmissionKind::Membership
            );
        }
    }

    #[test]
    fn columns_are_unique_per_table() {
        for kind in SubmissionKind::ALL {
            let mapping = for_kind(kind);
            let mut seen = HashSet::new();
            for spec in mapping.fields {
                assert!(
                    seen.insert(spec.column),
                    "{} maps two fields onto {}",
                    kind,
                    spec.column
                );
                assert_ne!(spec.column, mapping.owner_column);
            }
        }
    }

    #[test]
    fn email_column_is_fed_by_an_email_field() {
        for kind in SubmissionKind::ALL {
            let mapping = for_kind(kind);
            if let Some(column) = mapping.email_column {
                let spec = mapping
                    .fields
                    .iter()
                    .find(|spec| spec.column == column)
                    .expect("email column mapped");
                assert_eq!(spec.transform, Transform::Email);
                assert!(spec.is_required());
            }
        }
    }

    #[test]
    fn suggestion_renames_ui_fields() {
        let mapping = for_kind(SubmissionKind::Suggestion);
        let column = |field: &str| {
            mapping
                .fields
                .iter()
                .find(|spec| spec.field == field)
                .map(|spec| spec.column)
        };
        assert_eq!(column("subject"), Some("suggestion_title"));
        assert_eq!(column("category"), Some("suggestion_type"));
        assert_eq!(column("suggestion"), Some("suggestion_description"));
        assert_eq!(column("name"), Some("full_name"));
    }
}
