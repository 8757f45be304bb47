//! Catalog request forwarding.
//!
//! # Responsibilities
//! - Short-circuit CORS preflight without contacting upstream
//! - Rebuild the upstream URL from path segments and query
//! - Relay status, content type, and body back to the caller

use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::{Path, RawQuery, State},
    http::{
        header::{ACCEPT, CONTENT_TYPE, USER_AGENT},
        HeaderMap, HeaderValue, Method, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::catalog::error::CatalogError;
use crate::catalog::target::{build_upstream_url, split_segments, ForwardQuery};
use crate::http::request::RequestIdExt;
use crate::http::server::AppState;
use crate::observability::metrics;

const ENDPOINT: &str = "catalog";

/// Handler for the bare mount path.
pub async fn forward_root(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Body,
) -> Response {
    relay(&state, method, &headers, Vec::new(), query, body).await
}

/// Handler for `<mount>/{*path}`.
pub async fn forward_path(
    State(state): State<AppState>,
    Path(path): Path<String>,
    method: Method,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Body,
) -> Response {
    relay(&state, method, &headers, split_segments(&path), query, body).await
}

async fn relay(
    state: &AppState,
    method: Method,
    headers: &HeaderMap,
    segments: Vec<String>,
    raw_query: Option<String>,
    body: Body,
) -> Response {
    let start = Instant::now();

    if method == Method::OPTIONS {
        metrics::record_request(ENDPOINT, method.as_str(), 200, start);
        return StatusCode::OK.into_response();
    }

    let query = raw_query
        .as_deref()
        .map(ForwardQuery::parse)
        .unwrap_or_default();

    let content_type = headers.get(CONTENT_TYPE).cloned();
    let response = match forward(state, &method, &segments, &query, content_type, body).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(
                request_id = %headers.request_id(),
                method = %method,
                error = %e,
                "Catalog proxy error"
            );
            metrics::record_upstream_error(ENDPOINT, e.kind());
            e.into_response()
        }
    };

    metrics::record_request(
        ENDPOINT,
        method.as_str(),
        response.status().as_u16(),
        start,
    );
    response
}

async fn forward(
    state: &AppState,
    method: &Method,
    segments: &[String],
    query: &ForwardQuery,
    content_type: Option<HeaderValue>,
    body: Body,
) -> Result<Response, CatalogError> {
    let catalog = &state.config.catalog;
    let url = build_upstream_url(&catalog.upstream_base, segments, query)?;

    tracing::debug!(method = %method, upstream = %url, "Forwarding catalog request");

    let mut request = state
        .client
        .request(method.clone(), url)
        .header(ACCEPT, "application/json")
        .header(USER_AGENT, catalog.user_agent.as_str());

    if method != Method::GET && method != Method::HEAD {
        let bytes = axum::body::to_bytes(body, catalog.max_body_bytes).await?;
        if !bytes.is_empty() {
            if let Some(content_type) = content_type {
                request = request.header(CONTENT_TYPE, content_type);
            }
            request = request.body(bytes);
        }
    }

    let upstream = request.send().await?;
    let status = upstream.status();
    let content_type = upstream.headers().get(CONTENT_TYPE).cloned();
    let body = upstream.bytes().await?;

    if !status.is_success() {
        tracing::warn!(status = %status, "Catalog upstream returned error status");
    }

    relay_response(status, content_type, body)
}

/// Map an upstream response onto the relayed response.
///
/// - non-2xx: JSON bodies are re-serialized, anything else is relayed raw;
///   the upstream status is kept either way
/// - 2xx JSON: re-serialized with the upstream status
/// - 2xx other: raw body with 200
pub fn relay_response(
    status: StatusCode,
    content_type: Option<HeaderValue>,
    body: Bytes,
) -> Result<Response, CatalogError> {
    if !status.is_success() {
        return Ok(match serde_json::from_slice::<Value>(&body) {
            Ok(json) => (status, Json(json)).into_response(),
            Err(_) => raw_response(status, content_type, body),
        });
    }

    if is_json(content_type.as_ref()) {
        if body.is_empty() {
            return Ok(status.into_response());
        }
        let json: Value = serde_json::from_slice(&body)?;
        return Ok((status, Json(json)).into_response());
    }

    Ok(raw_response(StatusCode::OK, content_type, body))
}

fn is_json(content_type: Option<&HeaderValue>) -> bool {
    content_type
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_ascii_lowercase().contains("json"))
        .unwrap_or(false)
}

fn raw_response(status: StatusCode, content_type: Option<HeaderValue>, body: Bytes) -> Response {
    let content_type =
        content_type.unwrap_or_else(|| HeaderValue::from_static("text/plain; charset=utf-8"));
    (status, [(CONTENT_TYPE, content_type)], body).into_response()
}
