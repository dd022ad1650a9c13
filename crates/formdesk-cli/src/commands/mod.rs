use crate::error::invalid_input;
use anyhow::Result;
use formdesk_core::{Language, StatementExecutor, SubmissionKind};
use formdesk_remote::RemoteStore;
use formdesk_store::Store;
use serde::Serialize;
use std::io::{self, Write};

pub mod accounts;
pub mod forms;
pub mod maintenance;
pub mod submit;

pub const DEFAULT_LIST_LIMIT: u32 = 20;

/// Where statements go for this invocation.
pub enum Backend {
    Local(Store),
    Remote(RemoteStore),
}

impl Backend {
    pub fn executor(&self) -> &dyn StatementExecutor {
        match self {
            Backend::Local(store) => store,
            Backend::Remote(remote) => remote,
        }
    }

    pub fn local(&self) -> Option<&Store> {
        match self {
            Backend::Local(store) => Some(store),
            Backend::Remote(_) => None,
        }
    }

    pub fn local_mut(&mut self) -> Option<&mut Store> {
        match self {
            Backend::Local(store) => Some(store),
            Backend::Remote(_) => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Backend::Local(_) => "local",
            Backend::Remote(_) => "remote",
        }
    }
}

pub struct Context<'a> {
    pub backend: &'a Backend,
    pub json: bool,
    pub language: Language,
}

impl Context<'_> {
    pub fn executor(&self) -> &dyn StatementExecutor {
        self.backend.executor()
    }

    pub fn local_store(&self, operation: &str) -> Result<&Store> {
        self.backend
            .local()
            .ok_or_else(|| invalid_input(format!("{} requires local storage", operation)))
    }
}

pub fn parse_kind(raw: &str) -> Result<SubmissionKind> {
    raw.parse::<SubmissionKind>()
        .map_err(|err| invalid_input(err.to_string()))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
