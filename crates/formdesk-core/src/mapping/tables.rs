use super::{DefaultValue, FieldSpec, FormMapping, Transform, MAPPING_SCHEMA_VERSION};
use crate::domain::SubmissionKind;

use Transform::{Email, FirstName, Flag, Integer, LastName, Text};

pub(super) static MEMBERSHIP: FormMapping = FormMapping {
    kind: SubmissionKind::Membership,
    table: "membership_applications",
    owner_column: "user_id",
    email_column: Some("email"),
    unique_email: true,
    schema_version: MAPPING_SCHEMA_VERSION,
    fields: &[
        FieldSpec::required("email", "email", Email),
        FieldSpec::required("full_name", "first_name", FirstName),
        FieldSpec::optional("full_name", "last_name", LastName),
        FieldSpec::required("current_institution", "institution", Text),
        FieldSpec::optional("current_position", "position", Text),
        FieldSpec::optional("academic_degree", "highest_degree", Text),
        FieldSpec::optional("specialization", "field_of_study", Text),
        FieldSpec::optional("experience_years", "years_of_experience", Integer)
            .with_default(DefaultValue::Zero),
        FieldSpec::optional("research_interests", "primary_research_area", Text),
        FieldSpec::optional("motivation", "motivation", Text),
        FieldSpec::optional("cv_link", "cv_link", Text),
        FieldSpec::optional("additional_info", "additional_info", Text),
    ],
};

pub(super) static RESEARCH: FormMapping = FormMapping {
    kind: SubmissionKind::Research,
    table: "research_database",
    owner_column: "user_id",
    email_column: None,
    unique_email: false,
    schema_version: MAPPING_SCHEMA_VERSION,
    fields: &[
        FieldSpec::required("title", "paper_title", Text),
        FieldSpec::required("authors", "authors", Text),
        FieldSpec::required("publication_year", "publication_year", Integer),
        FieldSpec::optional("journal_conference", "conference_journal_book_title", Text),
        FieldSpec::required("publisher", "publisher_name", Text),
        FieldSpec::required("abstract", "abstract", Text),
        FieldSpec::optional("keywords", "keywords", Text),
        FieldSpec::optional("doi_link", "paper_url", Text),
        FieldSpec::required("research_type", "publication_type", Text),
        FieldSpec::optional("field_of_study", "article_classification", Text),
        FieldSpec::optional("language", "language", Text),
        FieldSpec::optional("additional_notes", "additional_notes", Text),
    ],
};

pub(super) static NOMINATION: FormMapping = FormMapping {
    kind: SubmissionKind::Nomination,
    table: "member_nominations",
    owner_column: "nominator_user_id",
    email_column: Some("nominator_email"),
    unique_email: false,
    schema_version: MAPPING_SCHEMA_VERSION,
    fields: &[
        FieldSpec::required("nominee_full_name", "nominee_full_name", Text),
        FieldSpec::required("nominee_email", "nominee_email", Email),
        FieldSpec::required("nominee_place_of_work", "nominee_place_of_work", Text),
        FieldSpec::required("nominee_specialization", "nominee_specialization", Text),
        FieldSpec::required("nominee_country", "nominee_country", Text),
        FieldSpec::required("nominee_phone", "nominee_phone", Text),
        FieldSpec::optional("nominee_address", "nominee_address", Text),
        FieldSpec::optional("nominee_url_link", "nominee_url_link", Text),
        FieldSpec::required("nominee_qualifications", "nominee_qualifications", Text),
        FieldSpec::required("nominating_member_name", "nominating_member_name", Text),
        FieldSpec::required("nominator_email", "nominator_email", Email),
        FieldSpec::required("nomination_reason", "nomination_reason", Text),
        FieldSpec::optional("additional_comments", "additional_comments", Text),
    ],
};

pub(super) static SUGGESTION: FormMapping = FormMapping {
    kind: SubmissionKind::Suggestion,
    table: "general_suggestions",
    owner_column: "user_id",
    email_column: Some("email"),
    unique_email: false,
    schema_version: MAPPING_SCHEMA_VERSION,
    fields: &[
        FieldSpec::required("name", "full_name", Text),
        FieldSpec::required("email", "email", Email),
        FieldSpec::required("category", "suggestion_type", Text),
        FieldSpec::required("subject", "suggestion_title", Text),
        FieldSpec::required("suggestion", "suggestion_description", Text),
        FieldSpec::optional("priority", "priority_level", Text),
        FieldSpec::optional("contact_back", "contact_back", Flag).with_default(DefaultValue::Zero),
        FieldSpec::optional("additional_info", "additional_comments", Text),
    ],
};

pub(super) static BANK_OF_IDEAS: FormMapping = FormMapping {
    kind: SubmissionKind::BankOfIdeas,
    table: "bank_of_ideas",
    owner_column: "user_id",
    email_column: Some("email"),
    unique_email: false,
    schema_version: MAPPING_SCHEMA_VERSION,
    fields: &[
        FieldSpec::required("email", "email", Email),
        FieldSpec::required("submitter_name", "submitter_name", Text),
        FieldSpec::optional("title_degrees", "title_degrees", Text),
        FieldSpec::required("project_title", "project_title", Text),
        FieldSpec::required("project_nature", "project_nature", Text),
        FieldSpec::optional("project_nature_other", "project_nature_other", Text)
            .with_default(DefaultValue::Null),
        FieldSpec::required("project_type", "project_type", Text),
        FieldSpec::optional("project_type_other", "project_type_other", Text)
            .with_default(DefaultValue::Null),
        FieldSpec::required("brief_description", "brief_description", Text),
        FieldSpec::optional("specialization_area", "specialization_area", Text),
        FieldSpec::optional("objectives", "objectives", Text),
        FieldSpec::optional("benefits", "benefits", Text),
        FieldSpec::optional("web_links", "web_links", Text).with_default(DefaultValue::Null),
        FieldSpec::optional("additional_notes", "additional_notes", Text)
            .with_default(DefaultValue::Null),
    ],
};
