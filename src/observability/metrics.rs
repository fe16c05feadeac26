//! Metrics collection and exposition.
//!
//! # Metrics
//! - `site_requests_total` (counter): requests by tenant, controller, status
//! - `site_request_duration_seconds` (histogram): latency by tenant
//! - `site_path_resolutions_total` (counter): exact / ancestor / not_found
//! - `site_dangling_references_total` (counter): skipped child references
//! - `site_tenant_misses_total` (counter): requests for unknown hosts

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(tenant: &str, controller: &str, status: u16, start: Instant) {
    ::metrics::counter!(
        "site_requests_total",
        "tenant" => tenant.to_string(),
        "controller" => controller.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("site_request_duration_seconds", "tenant" => tenant.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_path_resolution(outcome: &'static str) {
    ::metrics::counter!("site_path_resolutions_total", "outcome" => outcome).increment(1);
}

pub fn record_dangling_reference() {
    ::metrics::counter!("site_dangling_references_total").increment(1);
}

pub fn record_tenant_miss() {
    ::metrics::counter!("site_tenant_misses_total").increment(1);
}
