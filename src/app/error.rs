use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UttarError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned status {0}")]
    Status(u16),

    #[error("Server rejected the request: {0}")]
    Rejected(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unexpected response shape: {0}")]
    Schema(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session rejected by server (status {0})")]
    Unauthorized(u16),

    #[error("Toggle target is not tracked: {0}")]
    UntrackedTarget(String),

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, UttarError>;
