//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lb_requests_total` (counter): dispatched requests by method, status, backend
//! - `lb_request_duration_seconds` (histogram): latency until response head
//! - `lb_backend_up` (gauge): 1=alive, 0=dead, written by the health monitor
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter with its own HTTP listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, backend: &str, start: Instant) {
    metrics::counter!(
        "lb_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "backend" => backend.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "lb_request_duration_seconds",
        "method" => method.to_string(),
        "backend" => backend.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_backend_health(backend: &str, healthy: bool) {
    metrics::gauge!("lb_backend_up", "backend" => backend.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}
