use crate::error::{RemoteError, Result};
use crate::protocol::{parse_response, RequestBody};
use formdesk_core::{Statement, StatementExecutor, StatementResult, StorageError};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct RemoteOptions {
    pub url: String,
    pub auth_token: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: Option<String>,
}

impl RemoteOptions {
    pub fn new(url: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth_token: auth_token.into(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: None,
        }
    }
}

/// Executor that forwards statements to a remote SQL proxy. Each call is one
/// HTTP request; a batch travels in a single request.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    client: Client,
    endpoint: Url,
    auth_token: String,
}

impl RemoteStore {
    pub fn connect(options: RemoteOptions) -> Result<Self> {
        let endpoint = endpoint_url(&options.url)?;
        let auth_token = options.auth_token.trim().to_string();
        if auth_token.is_empty() {
            return Err(RemoteError::MissingToken);
        }
        let client = Client::builder()
            .user_agent(options.user_agent.as_deref().unwrap_or("formdesk"))
            .timeout(options.timeout)
            .connect_timeout(options.connect_timeout)
            .build()?;
        debug!(
            endpoint = %endpoint,
            token_len = auth_token.len(),
            "remote store configured"
        );
        Ok(Self {
            client,
            endpoint,
            auth_token,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn send(&self, statements: &[Statement]) -> std::result::Result<Vec<StatementResult>, StorageError> {
        if statements.is_empty() {
            return Ok(Vec::new());
        }
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.auth_token)
            .json(&RequestBody::new(statements))
            .send()
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().map_err(transport_error)?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "remote store refused request");
            return Err(status_error(status, &body));
        }
        debug!(statements = statements.len(), "remote batch executed");
        parse_response(&body, statements.len())
    }
}

impl StatementExecutor for RemoteStore {
    fn execute(&self, statement: &Statement) -> std::result::Result<StatementResult, StorageError> {
        self.send(std::slice::from_ref(statement))?
            .pop()
            .ok_or_else(|| StorageError::Rejected("empty response".to_string()))
    }

    fn execute_batch(
        &self,
        statements: &[Statement],
    ) -> std::result::Result<Vec<StatementResult>, StorageError> {
        self.send(statements)
    }
}

/// Accepts `https` endpoints, `libsql://` database URLs (served over https)
/// and plain `http` for a server on the loopback host.
pub fn endpoint_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let url = match raw.strip_prefix("libsql://") {
        Some(rest) => Url::parse(&format!("https://{}", rest))?,
        None => Url::parse(raw)?,
    };
    match url.scheme() {
        "https" => Ok(url),
        "http" if is_loopback(&url) => Ok(url),
        _ => Err(RemoteError::InsecureUrl(url.to_string())),
    }
}

fn is_loopback(url: &Url) -> bool {
    matches!(url.host_str(), Some("localhost") | Some("127.0.0.1") | Some("[::1]"))
}

fn transport_error(err: reqwest::Error) -> StorageError {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        StorageError::Unavailable(err.to_string())
    } else {
        StorageError::Rejected(err.to_string())
    }
}

fn status_error(status: StatusCode, body: &str) -> StorageError {
    let detail = body.trim();
    let message = if detail.is_empty() {
        format!("http status {}", status)
    } else {
        format!("http status {}: {}", status, detail)
    };
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        StorageError::Unavailable(message)
    } else {
        StorageError::Rejected(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteErrorKind;

    #[test]
    fn endpoint_requires_https_outside_loopback() {
        assert!(endpoint_url("https://db.example.io").is_ok());
        assert!(endpoint_url("http://localhost:8080").is_ok());
        assert!(endpoint_url("http://127.0.0.1:8080").is_ok());

        let err = endpoint_url("http://db.example.io").expect_err("plain http");
        assert_eq!(err.kind(), RemoteErrorKind::InsecureUrl);
    }

    #[test]
    fn libsql_scheme_maps_to_https() {
        let url = endpoint_url("libsql://forms-org.turso.io").expect("libsql url");
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("forms-org.turso.io"));
    }

    #[test]
    fn connect_requires_token() {
        let err = RemoteStore::connect(RemoteOptions::new("https://db.example.io", "  "))
            .expect_err("missing token");
        assert_eq!(err.kind(), RemoteErrorKind::MissingToken);
    }

    #[test]
    fn throttling_and_server_errors_are_transient() {
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, ""),
            StorageError::Unavailable(_)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, "upstream"),
            StorageError::Unavailable(_)
        ));
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "bad token"),
            StorageError::Rejected(_)
        ));
    }

    #[test]
    fn unreachable_server_is_unavailable() {
        let mut options = RemoteOptions::new("http://127.0.0.1:9", "token");
        options.connect_timeout = Duration::from_millis(200);
        options.timeout = Duration::from_millis(500);
        let store = RemoteStore::connect(options).expect("connect");
        let err = store
            .execute(&Statement::new("SELECT 1;"))
            .expect_err("nothing listens on the discard port");
        assert!(matches!(err, StorageError::Unavailable(_)));
    }
}
