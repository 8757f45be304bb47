//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catalog and image relays
//! - Wire up middleware (tracing, request ID, timeout, CORS)
//! - Bind server to listener
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::header::InvalidHeaderValue,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use thiserror::Error;
use reqwest::redirect;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::catalog;
use crate::config::validation::validate_config;
use crate::config::{ConfigError, RelayConfig};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::response::CorsHeaders;
use crate::image::{self, ImagePolicy};

/// Liveness route served next to the relays.
pub const HEALTH_ROUTE: &str = "/healthz";

/// Errors raised while assembling the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid header value in configuration: {0}")]
    Header(#[from] InvalidHeaderValue),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub client: reqwest::Client,
    /// Follows redirects only while they stay on the image allow-list.
    pub image_client: reqwest::Client,
    pub image: Arc<ImagePolicy>,
}

/// Redirect hops followed before an image fetch fails.
const MAX_IMAGE_REDIRECTS: usize = 5;

impl AppState {
    pub fn new(config: RelayConfig) -> Result<Self, ServerError> {
        // No response cache is kept by either client.
        let client = client_builder(&config).build()?;
        let image = Arc::new(ImagePolicy::try_from(&config.image)?);

        let allow_list = image.allow_list.clone();
        let image_client = client_builder(&config)
            .redirect(redirect::Policy::custom(move |attempt| {
                if attempt.previous().len() > MAX_IMAGE_REDIRECTS {
                    attempt.error("too many redirects")
                } else if attempt
                    .url()
                    .host_str()
                    .is_some_and(|host| allow_list.contains(host))
                {
                    attempt.follow()
                } else {
                    attempt.stop()
                }
            }))
            .build()?;

        Ok(Self {
            config: Arc::new(config),
            client,
            image_client,
            image,
        })
    }
}

fn client_builder(config: &RelayConfig) -> reqwest::ClientBuilder {
    let builder = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(config.client.connect_secs));
    if config.client.system_proxy {
        builder
    } else {
        builder.no_proxy()
    }
}

/// HTTP server for the relay.
pub struct RelayServer {
    router: Router,
    config: Arc<RelayConfig>,
}

impl RelayServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// The config is validated here as well, since routes that collide
    /// cannot be mounted.
    pub fn new(config: RelayConfig) -> Result<Self, ServerError> {
        validate_config(&config).map_err(ConfigError::Validation)?;
        let cors = CorsHeaders::try_from(&config.cors)?;
        let state = AppState::new(config)?;
        let config = state.config.clone();
        let router = Self::build_router(&config, cors, state);

        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RelayConfig, cors: CorsHeaders, state: AppState) -> Router {
        let timeout = Duration::from_secs(config.timeouts.request_secs);

        let catalog = cors.apply(
            catalog::router(&config.catalog.mount).layer(TimeoutLayer::new(timeout)),
        );
        let image = image::router(&config.image.route).layer(TimeoutLayer::new(timeout));

        Router::new()
            .route(HEALTH_ROUTE, get(health))
            .merge(catalog)
            .merge(image)
            .with_state(state)
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// Router with all layers applied, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// the shutdown channel fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            catalog_mount = %self.config.catalog.mount,
            image_route = %self.config.image.route,
            upstream = %self.config.catalog.upstream_base,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
