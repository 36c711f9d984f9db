//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_requests_total` (counter): dispatched requests by controller, action, outcome
//! - `router_dispatch_duration_seconds` (histogram): time from match to render/redirect
//! - `router_unmatched_total` (counter): requests no route matched
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; without an installed recorder
//!   every call is a no-op
//! - Prometheus exporter runs its own HTTP listener

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a dispatched request.
pub fn record_dispatch(controller: &str, action: &str, outcome: &'static str, start: Instant) {
    metrics::counter!(
        "router_requests_total",
        "controller" => controller.to_string(),
        "action" => action.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!(
        "router_dispatch_duration_seconds",
        "controller" => controller.to_string(),
        "action" => action.to_string(),
        "outcome" => outcome
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a request no route matched.
pub fn record_unmatched() {
    metrics::counter!("router_unmatched_total").increment(1);
}
