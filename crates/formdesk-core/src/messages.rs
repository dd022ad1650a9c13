//! Localized, user-facing text for submission results.

use crate::domain::SubmissionKind;
use crate::error::{EmailFormatIssue, SubmissionError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language: {0}")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "ar" | "arabic" => Ok(Language::Ar),
            _ => Err(UnknownLanguage(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    EmailContainsWhitespace,
    EmailMalformed,
    DuplicateEmail,
    MissingRequiredField,
    InvalidFieldValue,
    UnmappedField,
    StorageUnavailable,
    StorageRejected,
    FormSubmitted,
    ApplicationSubmitted,
    EmailAvailable,
    EmailInUse,
}

impl MessageKey {
    pub fn for_error(err: &SubmissionError) -> Self {
        match err {
            SubmissionError::InvalidEmailFormat {
                issue: EmailFormatIssue::ContainsWhitespace,
                ..
            } => MessageKey::EmailContainsWhitespace,
            SubmissionError::InvalidEmailFormat {
                issue: EmailFormatIssue::Malformed,
                ..
            } => MessageKey::EmailMalformed,
            SubmissionError::DuplicateEmail { .. } => MessageKey::DuplicateEmail,
            SubmissionError::MissingRequiredField { .. } => MessageKey::MissingRequiredField,
            SubmissionError::InvalidFieldValue { .. } => MessageKey::InvalidFieldValue,
            SubmissionError::UnmappedField { .. } => MessageKey::UnmappedField,
            SubmissionError::StorageUnavailable(_) => MessageKey::StorageUnavailable,
            SubmissionError::StorageRejected(_) => MessageKey::StorageRejected,
        }
    }

    /// Confirmation shown after a stored submission.
    pub fn submitted(kind: SubmissionKind) -> Self {
        match kind {
            SubmissionKind::Membership => MessageKey::ApplicationSubmitted,
            _ => MessageKey::FormSubmitted,
        }
    }

    /// Answer to an email lookup that found a match.
    pub fn email_taken(kind: SubmissionKind) -> Self {
        match kind {
            SubmissionKind::Membership => MessageKey::DuplicateEmail,
            _ => MessageKey::EmailInUse,
        }
    }
}

pub fn message(key: MessageKey, language: Language) -> &'static str {
    match (key, language) {
        (MessageKey::EmailContainsWhitespace, Language::En) => {
            "Email address cannot contain spaces."
        }
        (MessageKey::EmailContainsWhitespace, Language::Ar) => {
            "البريد الإلكتروني لا يجب أن يحتوي على مسافات"
        }
        (MessageKey::EmailMalformed, Language::En) => {
            "Please enter a valid email address containing @."
        }
        (MessageKey::EmailMalformed, Language::Ar) => {
            "يرجى إدخال عنوان بريد إلكتروني صحيح يحتوي على @"
        }
        (MessageKey::DuplicateEmail, Language::En) => {
            "Membership information for this email has already been submitted."
        }
        (MessageKey::DuplicateEmail, Language::Ar) => {
            "معلومات العضوية للبريد الإلكتروني المستخدم تم إدخالها من قبل"
        }
        (MessageKey::MissingRequiredField, Language::En) => "Please fill in all required fields.",
        (MessageKey::MissingRequiredField, Language::Ar) => "يرجى ملء جميع الحقول المطلوبة",
        (MessageKey::InvalidFieldValue, Language::En) => "One of the values entered is not valid.",
        (MessageKey::InvalidFieldValue, Language::Ar) => "إحدى القيم المدخلة غير صالحة",
        (MessageKey::UnmappedField, Language::En) => {
            "The form sent a field that cannot be stored. Please contact the site administrators."
        }
        (MessageKey::UnmappedField, Language::Ar) => {
            "أرسل النموذج حقلاً لا يمكن حفظه. يرجى التواصل مع إدارة الموقع"
        }
        (MessageKey::StorageUnavailable, Language::En) => {
            "The service is temporarily unavailable. Please try again."
        }
        (MessageKey::StorageUnavailable, Language::Ar) => {
            "الخدمة غير متاحة مؤقتاً. يرجى المحاولة مرة أخرى"
        }
        (MessageKey::StorageRejected, Language::En) => {
            "Your submission could not be saved."
        }
        (MessageKey::StorageRejected, Language::Ar) => "تعذر حفظ طلبك",
        (MessageKey::FormSubmitted, Language::En) => "Your form has been submitted successfully!",
        (MessageKey::FormSubmitted, Language::Ar) => "تم إرسال النموذج بنجاح!",
        (MessageKey::ApplicationSubmitted, Language::En) => {
            "Your application has been submitted successfully!"
        }
        (MessageKey::ApplicationSubmitted, Language::Ar) => "تم إرسال طلبك بنجاح!",
        (MessageKey::EmailAvailable, Language::En) => "Email is available",
        (MessageKey::EmailAvailable, Language::Ar) => "البريد الإلكتروني متاح",
        (MessageKey::EmailInUse, Language::En) => "This email has already been used.",
        (MessageKey::EmailInUse, Language::Ar) => "هذا البريد الإلكتروني مستخدم من قبل",
    }
}

impl SubmissionError {
    pub fn localized(&self, language: Language) -> &'static str {
        message(MessageKey::for_error(self), language)
    }
}
