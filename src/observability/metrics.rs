//! Metrics collection and exposition.
//!
//! # Metrics
//! - `edge_requests_total` (counter): requests by dispatch target and status
//! - `edge_request_duration_seconds` (histogram): latency by dispatch target
//! - `edge_asset_fallthrough_total` (counter): static candidates not served from the store
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed (tests, embedded use)
//! - Prometheus endpoint served by the exporter's own listener

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and start its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one routed request.
pub fn record_request(target: &'static str, status: u16, start_time: Instant) {
    metrics::counter!(
        "edge_requests_total",
        "target" => target,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("edge_request_duration_seconds", "target" => target)
        .record(start_time.elapsed().as_secs_f64());
}

/// Record a static candidate that fell through to the next route.
pub fn record_asset_fallthrough(reason: &'static str) {
    metrics::counter!("edge_asset_fallthrough_total", "reason" => reason).increment(1);
}
