use crate::commands::{parse_kind, print_json, Context, DEFAULT_LIST_LIMIT};
use crate::error::CliError;
use anyhow::Result;
use clap::Args;
use formdesk_core::mapping::{self, drift::verify_mapping};
use formdesk_core::messages::{message, MessageKey};
use formdesk_core::{FormMappingDto, SubmissionKind, Submitter, Value};
use formdesk_store::SubmissionsRepo;
use serde::Serialize;

#[derive(Debug, Args)]
pub struct CheckEmailArgs {
    pub email: String,
    #[arg(long, default_value = "membership")]
    pub kind: String,
}

#[derive(Debug, Args)]
pub struct FieldsArgs {
    pub kind: String,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    pub kind: String,
    #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
    pub limit: u32,
}

#[derive(Debug, Args)]
pub struct VerifySchemaArgs {}

#[derive(Debug, Serialize)]
struct EmailCheckDto<'a> {
    email: &'a str,
    kind: SubmissionKind,
    exists: bool,
    message: &'static str,
}

pub fn check_email(ctx: &Context<'_>, args: CheckEmailArgs) -> Result<()> {
    let kind = parse_kind(&args.kind)?;
    let exists = Submitter::new(ctx.executor()).check_email_exists(kind, &args.email)?;
    let key = if exists {
        MessageKey::email_taken(kind)
    } else {
        MessageKey::EmailAvailable
    };
    let text = message(key, ctx.language);

    if ctx.json {
        return print_json(&EmailCheckDto {
            email: args.email.trim(),
            kind,
            exists,
            message: text,
        });
    }
    println!("{}", text);
    Ok(())
}

pub fn show_fields(ctx: &Context<'_>, args: FieldsArgs) -> Result<()> {
    let kind = parse_kind(&args.kind)?;
    let dto = FormMappingDto::from(mapping::for_kind(kind));
    if ctx.json {
        return print_json(&dto);
    }

    println!("{} -> {}", dto.kind, dto.table);
    for field in &dto.fields {
        let presence = if field.required {
            "required".to_string()
        } else {
            format!("optional, default {}", field.default.unwrap_or("''"))
        };
        println!(
            "  {:<28} {:<32} {} ({})",
            field.field, field.column, field.transform, presence
        );
    }
    Ok(())
}

pub fn list_submissions(ctx: &Context<'_>, args: ListArgs) -> Result<()> {
    let kind = parse_kind(&args.kind)?;
    let rows = SubmissionsRepo::new(ctx.executor()).list_recent(kind, args.limit)?;
    if ctx.json {
        return print_json(&rows);
    }

    if rows.is_empty() {
        println!("no {} submissions", kind);
        return Ok(());
    }
    let mapping = mapping::for_kind(kind);
    let label_column = mapping
        .email_column
        .or_else(|| mapping.fields.first().map(|spec| spec.column))
        .unwrap_or_default();
    for row in rows {
        let label = row
            .get(label_column)
            .and_then(Value::as_str)
            .unwrap_or_default();
        println!(
            "{:>6}  {}  {}",
            row.id,
            row.submitted_at.as_deref().unwrap_or("-"),
            label
        );
    }
    Ok(())
}

pub fn verify_schema(ctx: &Context<'_>, _args: VerifySchemaArgs) -> Result<()> {
    let mut reports = Vec::with_capacity(SubmissionKind::ALL.len());
    for kind in SubmissionKind::ALL {
        reports.push(verify_mapping(ctx.executor(), mapping::for_kind(kind))?);
    }
    let drifted = reports.iter().filter(|report| !report.is_clean()).count();

    if ctx.json {
        print_json(&reports)?;
    } else {
        for report in &reports {
            if !report.table_exists {
                println!("{}: table missing", report.table);
            } else if report.missing_columns.is_empty() {
                println!("{}: ok", report.table);
            } else {
                println!(
                    "{}: missing columns {}",
                    report.table,
                    report.missing_columns.join(", ")
                );
            }
            if !report.unfed_columns.is_empty() {
                println!("  not fed by any field: {}", report.unfed_columns.join(", "));
            }
        }
    }

    if drifted > 0 {
        return Err(CliError::SchemaDrift(drifted).into());
    }
    Ok(())
}
