//! Storage adapter for a libSQL/sqld server reached over its HTTP
//! `statements` endpoint.

pub mod client;
pub mod error;
pub mod protocol;

pub use client::{RemoteOptions, RemoteStore};
pub use error::{RemoteError, RemoteErrorKind, Result};
