//! Prometheus metrics for pipeline runs.
//!
//! The recording helpers are no-ops until an exporter is installed, so the
//! pipeline can call them unconditionally.

use std::net::SocketAddr;
use std::time::Duration;

use ::metrics::{counter, histogram};

pub fn init_metrics(port: u16) {
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => {
            tracing::info!("Prometheus exporter listening on http://{}/metrics", addr);
        }
        Err(e) => {
            tracing::warn!("Prometheus exporter install failed (possibly already installed): {}", e);
        }
    }
}

pub fn run_started() {
    counter!("feeds_runs_total").increment(1);
}

pub fn source_loaded(source: &str, records: usize) {
    counter!("feeds_source_records_total", "source" => source.to_string())
        .increment(records as u64);
}

pub fn source_failed(source: &str, kind: &'static str) {
    counter!("feeds_source_failures_total", "source" => source.to_string(), "kind" => kind)
        .increment(1);
}

pub fn source_duration(source: &str, elapsed: Duration) {
    histogram!("feeds_source_duration_seconds", "source" => source.to_string())
        .record(elapsed.as_secs_f64());
}
