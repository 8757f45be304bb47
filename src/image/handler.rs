//! Image fetch relay.
//!
//! # Responsibilities
//! - Validate the `url` parameter against the allow-list
//! - Fetch with the referer the image host expects
//! - Stream bytes back with long-lived cache headers

use std::time::Instant;

use axum::{
    body::Body,
    extract::{RawQuery, State},
    http::{
        header::{
            InvalidHeaderValue, ACCEPT, CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE, REFERER,
            USER_AGENT,
        },
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
};

use crate::config::ImageConfig;
use crate::http::request::RequestIdExt;
use crate::http::server::AppState;
use crate::image::allow_list::AllowList;
use crate::image::error::ImageError;
use crate::observability::metrics;

const ENDPOINT: &str = "image";

/// Name of the query parameter carrying the target URL.
pub const URL_PARAM: &str = "url";

/// Pre-validated header values and allow-list used for every image request.
#[derive(Debug, Clone)]
pub struct ImagePolicy {
    pub allow_list: AllowList,
    referer: HeaderValue,
    accept: HeaderValue,
    user_agent: HeaderValue,
    default_content_type: HeaderValue,
    cache_control: HeaderValue,
}

impl TryFrom<&ImageConfig> for ImagePolicy {
    type Error = InvalidHeaderValue;

    fn try_from(config: &ImageConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            allow_list: AllowList::new(config.allowed_hosts.iter().cloned()),
            referer: HeaderValue::from_str(&config.referer)?,
            accept: HeaderValue::from_str(&config.accept)?,
            user_agent: HeaderValue::from_str(&config.user_agent)?,
            default_content_type: HeaderValue::from_str(&config.default_content_type)?,
            cache_control: HeaderValue::from_str(&config.cache_control)?,
        })
    }
}

/// Handler for `GET <image.route>?url=<absolute-url>`.
pub async fn proxy_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    let start = Instant::now();
    let target = query.as_deref().and_then(url_param);

    let response = match fetch(&state, target.as_deref()).await {
        Ok(response) => response,
        Err(e) => {
            match &e {
                ImageError::Transport(_) => {
                    tracing::error!(request_id = %headers.request_id(), error = %e, "Image proxy error");
                    metrics::record_upstream_error(ENDPOINT, e.reason());
                }
                ImageError::UpstreamStatus(status) => {
                    tracing::warn!(request_id = %headers.request_id(), status = %status, "Image upstream returned error status");
                    metrics::record_upstream_error(ENDPOINT, e.reason());
                }
                _ => {
                    tracing::debug!(request_id = %headers.request_id(), reason = e.reason(), url = ?target, "Image request rejected");
                    metrics::record_image_rejection(e.reason());
                }
            }
            e.into_response()
        }
    };

    metrics::record_request(ENDPOINT, "GET", response.status().as_u16(), start);
    response
}

/// First occurrence of the `url` parameter in a raw query string.
fn url_param(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == URL_PARAM)
        .map(|(_, value)| value.into_owned())
}

async fn fetch(state: &AppState, raw: Option<&str>) -> Result<Response, ImageError> {
    let policy = &state.image;
    let url = policy.allow_list.check(raw)?;

    tracing::debug!(upstream = %url, "Fetching image");

    let upstream = state
        .image_client
        .get(url)
        .header(REFERER, policy.referer.clone())
        .header(ACCEPT, policy.accept.clone())
        .header(USER_AGENT, policy.user_agent.clone())
        .send()
        .await?;

    let status = upstream.status();
    if !status.is_success() {
        return Err(ImageError::UpstreamStatus(status));
    }

    let content_type = upstream
        .headers()
        .get(CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| policy.default_content_type.clone());
    let content_length = upstream.headers().get(CONTENT_LENGTH).cloned();

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, content_type);
    if let Some(length) = content_length {
        headers.insert(CONTENT_LENGTH, length);
    }
    headers.insert(CACHE_CONTROL, policy.cache_control.clone());

    Ok(response)
}
