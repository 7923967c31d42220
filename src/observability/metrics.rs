//! Metrics collection.
//!
//! # Metrics
//! - `invocations_total` (counter): invocations by kind (single, batch)
//! - `requests_total` (counter): requests by method, status, outcome
//! - `request_duration_seconds` (histogram): handler latency by outcome
//! - `batch_records_failed_total` (counter): failed batch records by source
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; the embedder installs a recorder
//! - Without a recorder every call is a no-op

use std::time::Instant;

/// Count one invocation.
pub fn record_invocation(kind: &'static str) {
    metrics::counter!("invocations_total", "kind" => kind).increment(1);
}

/// Count one processed request and record its latency.
pub fn record_request(method: &str, status: u16, outcome: &'static str, start: Instant) {
    metrics::counter!(
        "requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("request_duration_seconds", "outcome" => outcome).record(start.elapsed().as_secs_f64());
}

/// Count failed records of one batch.
pub fn record_batch_failures(source: &'static str, failed: usize) {
    if failed > 0 {
        metrics::counter!("batch_records_failed_total", "source" => source).increment(failed as u64);
    }
}
