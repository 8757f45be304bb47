//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Catalog API forwarding settings.
    pub catalog: CatalogConfig,

    /// Image fetch relay settings.
    pub image: ImageConfig,

    /// CORS headers stamped on catalog responses.
    pub cors: CorsConfig,

    /// Outbound HTTP client settings.
    pub client: ClientConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Catalog proxy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Local path prefix the proxy listens under.
    pub mount: String,

    /// Base URL of the upstream catalog API.
    pub upstream_base: String,

    /// User-Agent sent upstream.
    pub user_agent: String,

    /// Largest inbound body forwarded for non-GET requests, in bytes.
    pub max_body_bytes: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            mount: "/api/mangadex".to_string(),
            upstream_base: "https://api.mangadex.org".to_string(),
            user_agent: default_user_agent(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Image proxy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Route serving the image relay.
    pub route: String,

    /// Hostnames images may be fetched from (exact match).
    pub allowed_hosts: Vec<String>,

    /// Referer presented to the image host.
    pub referer: String,

    /// Accept header presented to the image host.
    pub accept: String,

    /// User-Agent sent upstream.
    pub user_agent: String,

    /// Content type used when upstream omits one.
    pub default_content_type: String,

    /// Cache-Control applied to relayed images.
    pub cache_control: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            route: "/api/image-proxy".to_string(),
            allowed_hosts: vec!["uploads.mangadex.org".to_string()],
            referer: "https://mangadex.org/".to_string(),
            accept: "image/avif,image/webp,image/apng,image/*,*/*;q=0.8".to_string(),
            user_agent: default_user_agent(),
            default_content_type: "image/jpeg".to_string(),
            cache_control: "public, s-maxage=86400, stale-while-revalidate=43200".to_string(),
        }
    }
}

/// CORS response headers.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allow_origin: String,
    pub allow_methods: String,
    pub allow_headers: String,
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: "*".to_string(),
            allow_methods: "GET,OPTIONS,PATCH,DELETE,POST,PUT".to_string(),
            allow_headers: "X-CSRF-Token, X-Requested-With, Accept, Accept-Version, \
                            Content-Length, Content-MD5, Content-Type, Date, X-Api-Version"
                .to_string(),
            allow_credentials: true,
        }
    }
}

/// Outbound HTTP client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Honor HTTP(S)_PROXY / NO_PROXY from the environment.
    pub system_proxy: bool,

    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            system_proxy: true,
            connect_secs: 10,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

fn default_user_agent() -> String {
    concat!("manga-relay/", env!("CARGO_PKG_VERSION")).to_string()
}
