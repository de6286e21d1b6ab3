//! Metrics collection and exposition.
//!
//! # Metrics
//! - `suggest_requests_total` (counter): requests by method, status
//! - `suggest_request_duration_seconds` (histogram): latency distribution
//! - `suggest_store_operations_total` (counter): store calls by operation, outcome
//! - `suggest_store_terms` (gauge): terms currently held by the store
//!
//! Recording is a no-op until a recorder is installed, so tests and
//! metrics-disabled deployments pay nothing beyond the macro call.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "suggest_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("suggest_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_store_operation(operation: &'static str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    counter!(
        "suggest_store_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_store_terms(count: usize) {
    gauge!("suggest_store_terms").set(count as f64);
}
