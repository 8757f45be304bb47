//! CORS-friendly relay for the MangaDex catalog API and its image host,
//! plus a typed catalog client.

pub mod catalog;
pub mod client;
pub mod config;
pub mod http;
pub mod image;
pub mod lifecycle;
pub mod observability;

pub use config::RelayConfig;
pub use http::RelayServer;
pub use lifecycle::Shutdown;
