//! Metrics collection and exposition.
//!
//! # Metrics
//! - `simple_routes_requests_total` (counter): requests by method, status, route
//! - `simple_routes_request_duration_seconds` (histogram): dispatch latency
//! - `simple_routes_routes_registered` (gauge): size of the route table
//!
//! Unmatched requests are labelled with the route `none`.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one dispatched request.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    let method = method.to_string();
    let status = status.to_string();
    let route = route.to_string();
    metrics::counter!(
        "simple_routes_requests_total",
        "method" => method.clone(),
        "status" => status.clone(),
        "route" => route.clone()
    )
    .increment(1);
    metrics::histogram!(
        "simple_routes_request_duration_seconds",
        "method" => method,
        "status" => status,
        "route" => route
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record the size of the configured route table.
pub fn record_route_count(count: usize) {
    metrics::gauge!("simple_routes_routes_registered").set(count as f64);
}
