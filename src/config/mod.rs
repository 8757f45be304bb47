//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!     → cloned into the relay state at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the image allow-list cannot change at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CatalogConfig, ClientConfig, CorsConfig, ImageConfig, ListenerConfig, LogFormat,
    ObservabilityConfig, RelayConfig, TimeoutConfig,
};
