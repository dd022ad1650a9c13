use crate::commands::{parse_kind, print_json, Context};
use crate::error::{invalid_input, CliError};
use anyhow::{Context as _, Result};
use clap::Args;
use formdesk_core::messages::{message, MessageKey};
use formdesk_core::{FormInput, Submitter, UserId};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Args)]
pub struct SubmitArgs {
    /// membership, research, nomination, suggestion or bank-of-ideas
    pub kind: String,
    /// Field value as name=value; repeatable
    #[arg(long = "field", short = 'f', value_name = "NAME=VALUE")]
    pub fields: Vec<String>,
    /// JSON object of field values; --field entries override it
    #[arg(long)]
    pub input: Option<PathBuf>,
    #[arg(long)]
    pub user_id: Option<i64>,
}

pub fn submit(ctx: &Context<'_>, args: SubmitArgs) -> Result<()> {
    let kind = parse_kind(&args.kind)?;
    let mut input = match &args.input {
        Some(path) => read_input_file(path)?,
        None => FormInput::new(),
    };
    for raw in &args.fields {
        let (name, value) = parse_field(raw)?;
        input.insert(name, value);
    }
    debug!(kind = %kind, fields = input.field_names().count(), "submitting form");

    let owner = args.user_id.map(UserId::new);
    let outcome = Submitter::new(ctx.executor()).submit_form(kind, &input, owner);

    if ctx.json {
        print_json(&outcome)?;
    } else if let Some(id) = outcome.id.filter(|_| outcome.success) {
        println!("{} (id {})", message(MessageKey::submitted(kind), ctx.language), id);
    }

    match outcome.error_code {
        None => Ok(()),
        Some(code) => Err(CliError::Refused {
            code,
            message: outcome
                .message(ctx.language)
                .unwrap_or(code.as_str())
                .to_string(),
        }
        .into()),
    }
}

fn read_input_file(path: &Path) -> Result<FormInput> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read form input {}", path.display()))?;
    serde_json::from_str(&contents).map_err(|err| {
        invalid_input(format!(
            "form input {} must be a JSON object of text, number or boolean values: {}",
            path.display(),
            err
        ))
    })
}

fn parse_field(raw: &str) -> Result<(&str, &str)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| invalid_input(format!("expected NAME=VALUE, got {:?}", raw)))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(invalid_input(format!("empty field name in {:?}", raw)));
    }
    Ok((name, value))
}

#[cfg(test)]
mod tests {
    use super::parse_field;

    #[test]
    fn parse_field_splits_on_first_equals() {
        assert_eq!(
            parse_field("doi_link=https://x.org/?a=b").expect("field"),
            ("doi_link", "https://x.org/?a=b")
        );
        assert!(parse_field("no-separator").is_err());
        assert!(parse_field(" =value").is_err());
    }
}
