use crate::domain::{validate_email, SubmissionKind, UserId};
use crate::error::{Result, SubmissionError};
use crate::mapping::{self, DefaultValue, FieldSpec, FormMapping, Presence, Transform};
use crate::storage::Value;
use serde::Deserialize;
use std::collections::BTreeMap;

/// A raw value as the presentation layer supplies it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct FormInput {
    fields: BTreeMap<String, FieldValue>,
}

impl FormInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.fields.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// Column/value pairs ready for insertion into a kind's table.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    kind: SubmissionKind,
    columns: Vec<(&'static str, Value)>,
    owner: Option<UserId>,
}

impl NormalizedRecord {
    pub fn kind(&self) -> SubmissionKind {
        self.kind
    }

    pub fn mapping(&self) -> &'static FormMapping {
        mapping::for_kind(self.kind)
    }

    pub fn columns(&self) -> &[(&'static str, Value)] {
        &self.columns
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }

    pub fn owner(&self) -> Option<UserId> {
        self.owner
    }

    pub fn with_owner(mut self, owner: Option<UserId>) -> Self {
        self.owner = owner;
        self
    }

    /// Normalized email the uniqueness guard keys on, for guarded kinds.
    pub fn guard_email(&self) -> Option<&str> {
        let column = self.mapping().guard_column()?;
        self.get(column).and_then(Value::as_str)
    }
}

/// Maps raw form input onto `kind`'s storage columns.
///
/// Pure: trims every value, validates emails and required fields, fills
/// defaults for absent optional fields, and refuses fields the mapping table
/// does not declare.
pub fn normalize(kind: SubmissionKind, input: &FormInput) -> Result<NormalizedRecord> {
    let mapping = mapping::for_kind(kind);
    if let Some(field) = input.field_names().find(|name| !mapping.accepts_field(name)) {
        return Err(SubmissionError::UnmappedField {
            field: field.to_string(),
        });
    }

    let mut columns = Vec::with_capacity(mapping.fields.len());
    for spec in mapping.fields {
        let value = match present_value(input.get(spec.field)) {
            Some(raw) => convert(spec, raw)?,
            None => match spec.presence {
                Presence::Required => {
                    return Err(SubmissionError::MissingRequiredField {
                        field: spec.field.to_string(),
                    })
                }
                Presence::Optional(default) => default_value(default),
            },
        };
        columns.push((spec.column, value));
    }

    Ok(NormalizedRecord {
        kind,
        columns,
        owner: None,
    })
}

fn present_value(value: Option<&FieldValue>) -> Option<&FieldValue> {
    match value {
        Some(FieldValue::Text(text)) if text.trim().is_empty() => None,
        other => other,
    }
}

fn default_value(default: DefaultValue) -> Value {
    match default {
        DefaultValue::Empty => Value::Text(String::new()),
        DefaultValue::Zero => Value::Integer(0),
        DefaultValue::Null => Value::Null,
    }
}

fn convert(spec: &FieldSpec, raw: &FieldValue) -> Result<Value> {
    let invalid = || SubmissionError::InvalidFieldValue {
        field: spec.field.to_string(),
    };
    match spec.transform {
        Transform::Text => Ok(Value::Text(text_of(raw))),
        Transform::Email => validate_email(&text_of(raw))
            .map(Value::Text)
            .map_err(|issue| SubmissionError::invalid_email(spec.field, issue)),
        Transform::Integer => match raw {
            FieldValue::Integer(value) => Ok(Value::Integer(*value)),
            FieldValue::Text(text) => text.trim().parse().map(Value::Integer).map_err(|_| invalid()),
            FieldValue::Bool(_) => Err(invalid()),
        },
        Transform::Flag => parse_flag(raw).map(Value::Integer).ok_or_else(invalid),
        Transform::FirstName => {
            let (first, _) = split_full_name(&text_of(raw));
            Ok(Value::Text(first))
        }
        Transform::LastName => {
            let (_, last) = split_full_name(&text_of(raw));
            Ok(Value::Text(last))
        }
    }
}

fn text_of(raw: &FieldValue) -> String {
    match raw {
        FieldValue::Text(text) => text.trim().to_string(),
        FieldValue::Integer(value) => value.to_string(),
        FieldValue::Bool(value) => value.to_string(),
    }
}

fn parse_flag(raw: &FieldValue) -> Option<i64> {
    match raw {
        FieldValue::Bool(value) => Some(i64::from(*value)),
        FieldValue::Integer(0) => Some(0),
        FieldValue::Integer(1) => Some(1),
        FieldValue::Integer(_) => None,
        FieldValue::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(1),
            "false" | "no" | "off" | "0" => Some(0),
            _ => None,
        },
    }
}

fn split_full_name(full_name: &str) -> (String, String) {
    let trimmed = full_name.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
        None => (trimmed.to_string(), String::new()),
    }
}
