use crate::domain::RecordId;
use crate::error::{ErrorCode, SubmissionError};
use crate::mapping::{DefaultValue, FormMapping, Presence, Transform};
use crate::messages::Language;
use serde::Serialize;

/// Result object handed back to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message_ar: Option<String>,
}

impl SubmissionOutcome {
    pub fn accepted(id: RecordId) -> Self {
        Self {
            success: true,
            id: Some(id),
            error_code: None,
            error_message_en: None,
            error_message_ar: None,
        }
    }

    pub fn rejected(err: &SubmissionError) -> Self {
        Self {
            success: false,
            id: None,
            error_code: Some(err.code()),
            error_message_en: Some(err.localized(Language::En).to_string()),
            error_message_ar: Some(err.localized(Language::Ar).to_string()),
        }
    }

    pub fn message(&self, language: Language) -> Option<&str> {
        match language {
            Language::En => self.error_message_en.as_deref(),
            Language::Ar => self.error_message_ar.as_deref(),
        }
    }
}

impl From<Result<RecordId, SubmissionError>> for SubmissionOutcome {
    fn from(result: Result<RecordId, SubmissionError>) -> Self {
        match result {
            Ok(id) => SubmissionOutcome::accepted(id),
            Err(err) => SubmissionOutcome::rejected(&err),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldSpecDto {
    pub field: &'static str,
    pub column: &'static str,
    pub required: bool,
    pub default: Option<&'static str>,
    pub transform: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormMappingDto {
    pub kind: &'static str,
    pub table: &'static str,
    pub unique_email: bool,
    pub schema_version: i64,
    pub fields: Vec<FieldSpecDto>,
}

impl From<&FormMapping> for FormMappingDto {
    fn from(mapping: &FormMapping) -> Self {
        Self {
            kind: mapping.kind.as_str(),
            table: mapping.table,
            unique_email: mapping.unique_email,
            schema_version: mapping.schema_version,
            fields: mapping
                .fields
                .iter()
                .map(|spec| FieldSpecDto {
                    field: spec.field,
                    column: spec.column,
                    required: spec.is_required(),
                    default: match spec.presence {
                        Presence::Required => None,
                        Presence::Optional(DefaultValue::Empty) => Some("''"),
                        Presence::Optional(DefaultValue::Zero) => Some("0"),
                        Presence::Optional(DefaultValue::Null) => Some("NULL"),
                    },
                    transform: match spec.transform {
                        Transform::Text => "text",
                        Transform::Email => "email",
                        Transform::Integer => "integer",
                        Transform::Flag => "flag",
                        Transform::FirstName => "first-name",
                        Transform::LastName => "last-name",
                    },
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SubmissionOutcome;
    use crate::domain::RecordId;
    use crate::error::SubmissionError;

    #[test]
    fn rejected_outcome_serializes_code_and_both_messages() {
        let outcome = SubmissionOutcome::from(Err::<RecordId, _>(SubmissionError::DuplicateEmail {
            email: "ada@example.com".to_string(),
        }));
        let json = serde_json::to_value(&outcome).expect("serialize");
        assert_eq!(json["success"], false);
        assert_eq!(json["error_code"], "duplicate_email");
        assert!(json["error_message_en"].is_string());
        assert!(json["error_message_ar"].is_string());
        assert!(json.get("id").is_none());
    }

    #[test]
    fn accepted_outcome_carries_id_only() {
        let outcome = SubmissionOutcome::accepted(RecordId::new(7));
        let json = serde_json::to_value(&outcome).expect("serialize");
        assert_eq!(json["success"], true);
        assert_eq!(json["id"], 7);
        assert!(json.get("error_code").is_none());
    }
}
