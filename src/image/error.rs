//! Image proxy errors and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Missing url parameter")]
    MissingUrl,

    #[error("Invalid URL")]
    InvalidUrl,

    #[error("Host not allowed: {0}")]
    HostNotAllowed(String),

    #[error("Upstream error {}", .0.as_u16())]
    UpstreamStatus(StatusCode),

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ImageError {
    pub fn status(&self) -> StatusCode {
        match self {
            ImageError::MissingUrl | ImageError::InvalidUrl | ImageError::HostNotAllowed(_) => {
                StatusCode::BAD_REQUEST
            }
            ImageError::UpstreamStatus(status) => *status,
            ImageError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Metric label for rejected or failed requests.
    pub fn reason(&self) -> &'static str {
        match self {
            ImageError::MissingUrl => "missing_url",
            ImageError::InvalidUrl => "invalid_url",
            ImageError::HostNotAllowed(_) => "host_not_allowed",
            ImageError::UpstreamStatus(_) => "upstream_status",
            ImageError::Transport(_) => "transport",
        }
    }

    /// Client-facing message. Transport details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            ImageError::HostNotAllowed(_) => "Host not allowed".to_string(),
            ImageError::Transport(_) => "Internal error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ImageError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.public_message() }))).into_response()
    }
}
