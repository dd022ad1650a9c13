use crate::error::EmailFormatIssue;

const MIN_EMAIL_LEN: usize = 6;

/// ASCII whitespace trimmed from both ends of an email, matching the character
/// list in [`normalized_email_sql`].
const EMAIL_PADDING: &[char] = &[' ', '\t', '\n', '\u{0b}', '\u{0c}', '\r'];

/// Trims and lower-cases an email for comparison. Returns `None` when nothing
/// is left after trimming.
///
/// Lower-casing is ASCII-only so it agrees with SQLite's `LOWER()`.
pub fn normalize_email(value: &str) -> Option<String> {
    let trimmed = value.trim_matches(EMAIL_PADDING);
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_ascii_lowercase())
}

/// SQL expression that normalizes `column` the way [`normalize_email`] does.
///
/// SQLite's one-argument `TRIM()` strips spaces only, so the padding set is
/// spelled out.
pub fn normalized_email_sql(column: &str) -> String {
    format!("LOWER(TRIM({}, char(32, 9, 10, 11, 12, 13)))", column)
}

/// Normalizes and validates an email the way every form field expects it.
///
/// Internal whitespace is rejected rather than stripped, so `"a b@example.com"`
/// never collapses into a different address.
pub fn validate_email(value: &str) -> Result<String, EmailFormatIssue> {
    let Some(email) = normalize_email(value) else {
        return Err(EmailFormatIssue::Malformed);
    };
    if email.chars().any(char::is_whitespace) {
        return Err(EmailFormatIssue::ContainsWhitespace);
    }
    if email.len() < MIN_EMAIL_LEN || !email.contains('@') || !email.contains('.') {
        return Err(EmailFormatIssue::Malformed);
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::{normalize_email, normalized_email_sql, validate_email};
    use crate::error::EmailFormatIssue;
    use proptest::prelude::*;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        let value = normalize_email("  Ada@Example.com ");
        assert_eq!(value.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn normalize_email_strips_control_padding() {
        let value = normalize_email("\tAda@Example.com\r\n");
        assert_eq!(value.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn normalized_email_sql_names_the_column() {
        assert_eq!(
            normalized_email_sql("nominator_email"),
            "LOWER(TRIM(nominator_email, char(32, 9, 10, 11, 12, 13)))"
        );
    }

    #[test]
    fn normalize_email_rejects_blank() {
        assert_eq!(normalize_email("   "), None);
    }

    #[test]
    fn validate_email_rejects_internal_whitespace() {
        assert_eq!(
            validate_email("a b@example.com"),
            Err(EmailFormatIssue::ContainsWhitespace)
        );
        assert_eq!(
            validate_email(" ada@exa\tmple.com "),
            Err(EmailFormatIssue::ContainsWhitespace)
        );
    }

    #[test]
    fn validate_email_requires_at_and_dot() {
        assert_eq!(
            validate_email("ada.example.com"),
            Err(EmailFormatIssue::Malformed)
        );
        assert_eq!(validate_email("ada@example"), Err(EmailFormatIssue::Malformed));
        assert_eq!(validate_email("a@b.c"), Err(EmailFormatIssue::Malformed));
    }

    #[test]
    fn validate_email_accepts_padded_mixed_case() {
        assert_eq!(
            validate_email("  Test@Example.com ").as_deref(),
            Ok("test@example.com")
        );
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(raw in "\\PC{0,40}") {
            let once = normalize_email(&raw);
            let twice = once.as_deref().and_then(normalize_email);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn validated_email_revalidates_to_itself(
            local in "[A-Za-z0-9._]{1,12}",
            domain in "[A-Za-z0-9]{1,10}",
            pad in " {0,3}",
        ) {
            let raw = format!("{pad}{local}@{domain}.Org{pad}");
            if let Ok(email) = validate_email(&raw) {
                prop_assert_eq!(validate_email(&email), Ok(email.clone()));
            }
        }
    }
}
