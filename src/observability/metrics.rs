//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define gateway metrics (request counts, latency, unrouted paths)
//! - Expose a Prometheus-compatible scrape endpoint
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by route and status
//! - `gateway_request_duration_seconds` (histogram): dispatch latency by route
//! - `gateway_unrouted_total` (counter): paths no mount claimed
//!
//! # Design Decisions
//! - The route label is the mount trail (e.g. "trading"), never the raw
//!   path, to keep label cardinality bounded
//! - The exporter runs on its own listener so scrapes never compete with
//!   client traffic

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
///
/// Failure to install is logged, not fatal: the gateway can still serve
/// traffic without a scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe();
            tracing::info!(address = %addr, "Metrics exporter listening");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install metrics exporter");
        }
    }
}

fn describe() {
    metrics::describe_counter!(
        "gateway_requests_total",
        "Total requests dispatched, by route and response status"
    );
    metrics::describe_histogram!(
        "gateway_request_duration_seconds",
        metrics::Unit::Seconds,
        "Time from request arrival to response sent, by route"
    );
    metrics::describe_counter!(
        "gateway_unrouted_total",
        "Requests whose path no mount claimed"
    );
}

/// Record one dispatched request.
pub fn record_request(route: &str, status: u16, start_time: Instant) {
    let elapsed = start_time.elapsed().as_secs_f64();
    metrics::counter!(
        "gateway_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "gateway_request_duration_seconds",
        "route" => route.to_string()
    )
    .record(elapsed);
}

/// Record a path that fell off the end of the table.
pub fn record_unrouted() {
    metrics::counter!("gateway_unrouted_total").increment(1);
}
