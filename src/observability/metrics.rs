//! Metrics collection and exposition.
//!
//! # Metrics
//! - `breaker_state` (gauge): 0=closed, 1=half-open, 2=open
//! - `breaker_transitions_total` (counter): by breaker, from, to
//! - `breaker_rejections_total` (counter): calls refused while open
//! - `breaker_calls_total` (counter): invoked calls by breaker, outcome
//! - `gateway_requests_total` (counter): by endpoint, status
//! - `gateway_request_duration_seconds` (histogram): handler latency

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

use crate::resilience::CircuitState;

/// Start the Prometheus scrape endpoint and install the global recorder.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

fn state_value(state: CircuitState) -> f64 {
    match state {
        CircuitState::Closed => 0.0,
        CircuitState::HalfOpen => 1.0,
        CircuitState::Open => 2.0,
    }
}

pub fn record_breaker_state(breaker: &str, state: CircuitState) {
    gauge!("breaker_state", "breaker" => breaker.to_string()).set(state_value(state));
}

pub fn record_transition(breaker: &str, from: CircuitState, to: CircuitState) {
    counter!(
        "breaker_transitions_total",
        "breaker" => breaker.to_string(),
        "from" => from.as_str(),
        "to" => to.as_str()
    )
    .increment(1);
    record_breaker_state(breaker, to);
}

pub fn record_rejection(breaker: &str) {
    counter!("breaker_rejections_total", "breaker" => breaker.to_string()).increment(1);
}

pub fn record_call(breaker: &str, outcome: &'static str) {
    counter!("breaker_calls_total", "breaker" => breaker.to_string(), "outcome" => outcome).increment(1);
}

pub fn record_request(endpoint: &str, status: u16, start: Instant) {
    counter!(
        "gateway_requests_total",
        "endpoint" => endpoint.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "endpoint" => endpoint.to_string())
        .record(start.elapsed().as_secs_f64());
}
