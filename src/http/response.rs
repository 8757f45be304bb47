//! Response header stamping.
//!
//! # Responsibilities
//! - Add permissive CORS headers to every catalog response
//! - Cover relayed responses, local errors, and timeouts alike
//!
//! # Design Decisions
//! - Headers are applied as router layers, outside the handlers, so no
//!   code path can return without them
//! - Values are validated once at startup

use axum::{
    http::{
        header::{
            InvalidHeaderValue, ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
            ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
        },
        HeaderValue,
    },
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::CorsConfig;

/// Validated CORS header values.
#[derive(Debug, Clone)]
pub struct CorsHeaders {
    allow_origin: HeaderValue,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
    allow_credentials: Option<HeaderValue>,
}

impl TryFrom<&CorsConfig> for CorsHeaders {
    type Error = InvalidHeaderValue;

    fn try_from(config: &CorsConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            allow_origin: HeaderValue::from_str(&config.allow_origin)?,
            allow_methods: HeaderValue::from_str(&config.allow_methods)?,
            allow_headers: HeaderValue::from_str(&config.allow_headers)?,
            allow_credentials: config
                .allow_credentials
                .then(|| HeaderValue::from_static("true")),
        })
    }
}

impl CorsHeaders {
    /// Wrap `router` so every response it produces carries the CORS headers.
    pub fn apply<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let router = router
            .layer(SetResponseHeaderLayer::overriding(
                ACCESS_CONTROL_ALLOW_ORIGIN,
                self.allow_origin,
            ))
            .layer(SetResponseHeaderLayer::overriding(
                ACCESS_CONTROL_ALLOW_METHODS,
                self.allow_methods,
            ))
            .layer(SetResponseHeaderLayer::overriding(
                ACCESS_CONTROL_ALLOW_HEADERS,
                self.allow_headers,
            ));

        match self.allow_credentials {
            Some(value) => router.layer(SetResponseHeaderLayer::overriding(
                ACCESS_CONTROL_ALLOW_CREDENTIALS,
                value,
            )),
            None => router,
        }
    }
}
