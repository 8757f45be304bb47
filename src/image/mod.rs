//! Allow-listed image relay.
//!
//! # Data Flow
//! ```text
//! <image.route>?url=...
//!     → allow_list.rs (present → absolute → exact host match)
//!     → handler.rs (fetch with referer, stream bytes + cache headers)
//! ```

pub mod allow_list;
pub mod error;
pub mod handler;

use axum::{routing::get, Router};

use crate::http::server::AppState;

pub use allow_list::AllowList;
pub use error::ImageError;
pub use handler::ImagePolicy;

/// Route serving the image relay at `route`.
pub fn router(route: &str) -> Router<AppState> {
    Router::new().route(route, get(handler::proxy_image))
}
