use crate::commands::{print_json, Context};
use crate::error::not_found;
use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use formdesk_core::accounts::Accounts;

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
}

#[derive(Debug, Args)]
pub struct WhoamiArgs {
    #[arg(long)]
    pub token: String,
}

pub fn register(ctx: &Context<'_>, args: RegisterArgs) -> Result<()> {
    let registration = Accounts::new(ctx.executor()).register(
        &args.email,
        &args.password,
        &args.first_name,
        &args.last_name,
    )?;

    if ctx.json {
        return print_json(&registration);
    }
    println!("registered user {}", registration.user_id);
    Ok(())
}

pub fn login(ctx: &Context<'_>, args: LoginArgs) -> Result<()> {
    let session = Accounts::new(ctx.executor()).login(&args.email, &args.password, Utc::now())?;

    if ctx.json {
        return print_json(&session);
    }
    let expires = DateTime::<Utc>::from_timestamp(session.expires_at, 0)
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| session.expires_at.to_string());
    println!("{}", session.token);
    println!("expires {}", expires);
    Ok(())
}

pub fn whoami(ctx: &Context<'_>, args: WhoamiArgs) -> Result<()> {
    let account = Accounts::new(ctx.executor())
        .user_by_token(&args.token, Utc::now())?
        .ok_or_else(|| not_found("no active session for token"))?;

    if ctx.json {
        return print_json(&account);
    }
    println!(
        "{} {} <{}> (id {})",
        account.first_name, account.last_name, account.email, account.id
    );
    Ok(())
}
