//! Metrics collection and exposition.
//!
//! # Metrics
//! - `quake_http_requests_total` (counter): requests by method, route, status
//! - `quake_http_request_duration_seconds` (histogram): latency distribution
//! - `quake_usgs_requests_total` (counter): upstream calls by outcome
//! - `quake_cache_lookups_total` (counter): cache hits and misses
//! - `quake_tasks_total` (counter): background task events
//!
//! Without an installed recorder every call is a no-op.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    counter!(
        "quake_http_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "quake_http_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_usgs_request(outcome: &'static str) {
    counter!("quake_usgs_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("quake_cache_lookups_total", "result" => result).increment(1);
}

pub fn record_task(event: &'static str) {
    counter!("quake_tasks_total", "event" => event).increment(1);
}
