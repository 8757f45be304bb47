//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): requests by endpoint, method, status
//! - `relay_request_duration_seconds` (histogram): latency by endpoint
//! - `relay_upstream_errors_total` (counter): failed upstream calls by endpoint, kind
//! - `relay_image_rejections_total` (counter): image requests refused by reason

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished request.
pub fn record_request(endpoint: &'static str, method: &str, status: u16, start: Instant) {
    counter!(
        "relay_requests_total",
        "endpoint" => endpoint,
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("relay_request_duration_seconds", "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}

/// Record an upstream call that failed before a usable response arrived.
pub fn record_upstream_error(endpoint: &'static str, kind: &'static str) {
    counter!("relay_upstream_errors_total", "endpoint" => endpoint, "kind" => kind).increment(1);
}

/// Record an image request refused during validation.
pub fn record_image_rejection(reason: &'static str) {
    counter!("relay_image_rejections_total", "reason" => reason).increment(1);
}
