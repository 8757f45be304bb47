use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned by [`CatalogClient`](super::CatalogClient).
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("catalog returned status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),
}
