//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define router metrics (requests, latency, invocations, routes)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `router_requests_total` (counter): requests by method, status, route
//! - `router_request_duration_seconds` (histogram): latency distribution
//! - `router_invocations_total` (counter): handler invocations by language, outcome
//! - `router_routes_loaded` (gauge): routes in the published table
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Route label is the pattern, never the raw path, to bound cardinality

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed request.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    let status = status.to_string();
    ::metrics::counter!(
        "router_requests_total",
        "method" => method.to_string(),
        "status" => status.clone(),
        "route" => route.to_string()
    )
    .increment(1);
    ::metrics::histogram!(
        "router_request_duration_seconds",
        "method" => method.to_string(),
        "status" => status,
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record one handler invocation and how it ended.
pub fn record_invocation(language: &str, outcome: &'static str) {
    ::metrics::counter!(
        "router_invocations_total",
        "language" => language.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record the size of a freshly published route table.
pub fn record_routes_loaded(count: usize) {
    ::metrics::gauge!("router_routes_loaded").set(count as f64);
}
