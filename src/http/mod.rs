//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID assignment and propagation)
//!     → catalog / image handlers
//!     → response.rs (CORS headers on catalog responses)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdExt, X_REQUEST_ID};
pub use response::CorsHeaders;
pub use server::{AppState, RelayServer, ServerError};
