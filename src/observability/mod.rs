//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Catalog and image handlers produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows from the request-id layer into every span
//! - Metric updates are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
