use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("invalid remote url: {0}")]
    Url(#[from] url::ParseError),
    #[error("remote url must use https: {0}")]
    InsecureUrl(String),
    #[error("missing remote auth token")]
    MissingToken,
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, RemoteError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    Url,
    InsecureUrl,
    MissingToken,
    Http,
}

impl RemoteError {
    pub fn kind(&self) -> RemoteErrorKind {
        match self {
            RemoteError::Url(_) => RemoteErrorKind::Url,
            RemoteError::InsecureUrl(_) => RemoteErrorKind::InsecureUrl,
            RemoteError::MissingToken => RemoteErrorKind::MissingToken,
            RemoteError::Http(_) => RemoteErrorKind::Http,
        }
    }
}
