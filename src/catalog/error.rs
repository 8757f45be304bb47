//! Catalog proxy failures that never reached a relayable upstream response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid upstream URL: {0}")]
    UpstreamUrl(#[from] url::ParseError),

    #[error("unreadable request body: {0}")]
    RequestBody(#[from] axum::Error),

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned malformed JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

impl CatalogError {
    /// Metric label for the failure.
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogError::UpstreamUrl(_) => "url",
            CatalogError::RequestBody(_) => "request_body",
            CatalogError::Transport(_) => "transport",
            CatalogError::Decode(_) => "decode",
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Proxy error", "details": self.to_string() })),
        )
            .into_response()
    }
}
