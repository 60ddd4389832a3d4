//! Metrics collection and exposition.
//!
//! # Metrics
//! - `rewriter_requests_total` (counter): pipeline outcomes by `outcome`
//!   (rewritten, unresolved, ignored, disabled, failed)
//! - `rewriter_rewrites_total` (counter): successful rewrites by `mode`
//! - `rewriter_cache_lookups_total` (counter): cache lookups by `strategy`, `result`
//! - `rewriter_errors_total` (counter): failed rewrites by `kind`
//!
//! Recording is a no-op until a recorder is installed, so the library can be
//! used without [`init_metrics`].

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    metrics::describe_counter!("rewriter_requests_total", "Requests seen by the rewrite pipeline");
    metrics::describe_counter!("rewriter_rewrites_total", "Successful base url rewrites");
    metrics::describe_counter!("rewriter_cache_lookups_total", "Rewrite cache lookups");
    metrics::describe_counter!("rewriter_errors_total", "Failed rewrites by error kind");

    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(outcome: &'static str) {
    metrics::counter!("rewriter_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_rewrite(mode: &'static str) {
    metrics::counter!("rewriter_rewrites_total", "mode" => mode).increment(1);
}

pub fn record_cache_lookup(strategy: &'static str, hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    metrics::counter!("rewriter_cache_lookups_total", "strategy" => strategy, "result" => result).increment(1);
}

pub fn record_rewrite_error(kind: &'static str) {
    metrics::counter!("rewriter_errors_total", "kind" => kind).increment(1);
}
