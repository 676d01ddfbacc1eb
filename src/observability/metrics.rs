//! Metrics collection and exposition.
//!
//! # Metrics
//! - `recon_requests_total` (counter): probes by method, decision, status
//! - `recon_request_duration_seconds` (histogram): decision latency
//! - `recon_tarpit_active` (gauge): tarpit streams currently held open
//!
//! # Design Decisions
//! - Low-overhead updates (atomic operations under the hood)
//! - Decision label captures what the hostile client was shown
//! - The tarpit gauge tracks held connections, the point of the exercise

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        tracing::error!(error = %e, "Failed to install Prometheus exporter");
        return;
    }

    describe_counter!(
        "recon_requests_total",
        "Inbound probes by method, decision, and status"
    );
    describe_histogram!(
        "recon_request_duration_seconds",
        "Time from receipt to response decision"
    );
    describe_gauge!(
        "recon_tarpit_active",
        "Tarpit streams currently held open"
    );

    tracing::info!(address = %addr, "Metrics exporter listening");
}

/// Record one decided request.
pub fn record_request(method: &str, status: u16, decision: &str, start: Instant) {
    counter!(
        "recon_requests_total",
        "method" => method.to_string(),
        "decision" => decision.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);
    histogram!("recon_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn tarpit_opened() {
    gauge!("recon_tarpit_active").increment(1.0);
}

pub fn tarpit_closed() {
    gauge!("recon_tarpit_active").decrement(1.0);
}
