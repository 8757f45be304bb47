//! Catalog API relay.
//!
//! # Data Flow
//! ```text
//! <mount>/{*path}?query
//!     → target.rs (segments + grouped query → upstream URL)
//!     → handler.rs (forward, relay status/body)
//!     → CORS headers stamped by the router layer
//! ```

pub mod error;
pub mod handler;
pub mod target;

use axum::{routing::any, Router};

use crate::http::server::AppState;

pub use error::CatalogError;
pub use target::{build_upstream_url, ForwardQuery, QueryValue};

/// Routes serving the catalog relay under `mount`.
pub fn router(mount: &str) -> Router<AppState> {
    Router::new()
        .route(mount, any(handler::forward_root))
        .route(&format!("{mount}/"), any(handler::forward_root))
        .route(&format!("{mount}/{{*path}}"), any(handler::forward_path))
}
