//! manga-relay: CORS-friendly relay for the MangaDex catalog API and its
//! image host.
//!
//! # Architecture Overview
//!
//! ```text
//!   Browser / manga-cli
//!          │
//!          ▼
//!   ┌──────────────────────────── manga-relay ───────────────────────────┐
//!   │  request-id → trace                                                │
//!   │      ├── <mount>/{*path} ── CORS ── catalog::handler ──────────────┼──▶ api.mangadex.org
//!   │      ├── /api/image-proxy ───────── image::handler (allow-list) ───┼──▶ uploads.mangadex.org
//!   │      └── /healthz                                                  │
//!   └────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use manga_relay::config::RelayConfig;
use manga_relay::lifecycle::startup;
use manga_relay::observability::logging;

#[derive(Parser)]
#[command(name = "manga-relay")]
#[command(about = "Relay for the MangaDex catalog API and image host", long_about = None)]
struct Args {
    /// Path to a TOML config file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match startup::resolve_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            // Logging is configured from the file that just failed to load.
            let _ = logging::init(&RelayConfig::default().observability);
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(&config.observability) {
        eprintln!("failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    if args.check {
        tracing::info!("Configuration is valid");
        return ExitCode::SUCCESS;
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "manga-relay starting"
    );

    match startup::run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Relay failed");
            ExitCode::FAILURE
        }
    }
}
