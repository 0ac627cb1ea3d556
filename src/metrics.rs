//! Prometheus metrics for evaluation throughput and outcomes.
//!
//! Recorded by the scanner, the HTTP API and the CLI. The evaluator itself
//! never touches a recorder.

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::debug;

use crate::arbitrage::SurebetResult;

// === Metric Name Constants ===

/// Evaluation latency metric name.
pub const METRIC_EVALUATION_LATENCY: &str = "evaluation_latency_ms";
/// Markets evaluated counter metric name.
pub const METRIC_MARKETS_EVALUATED: &str = "markets_evaluated_total";
/// Sure-bets found counter metric name.
pub const METRIC_SUREBETS_FOUND: &str = "surebets_found_total";
/// Rejected markets counter metric name (labelled by kind).
pub const METRIC_MARKETS_REJECTED: &str = "markets_rejected_total";
/// High-margin advisories counter metric name.
pub const METRIC_HIGH_MARGIN_ADVISORIES: &str = "high_margin_advisories_total";
/// Undecodable input records counter metric name.
pub const METRIC_INVALID_RECORDS: &str = "invalid_records_total";

/// Initialize all metric descriptions.
/// Call this once at startup, after a recorder is installed.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_EVALUATION_LATENCY,
        "Time to evaluate one market in milliseconds"
    );
    describe_counter!(METRIC_MARKETS_EVALUATED, "Total number of markets evaluated");
    describe_counter!(METRIC_SUREBETS_FOUND, "Total number of sure-bets found");
    describe_counter!(
        METRIC_MARKETS_REJECTED,
        "Total number of markets rejected, by rejection kind"
    );
    describe_counter!(
        METRIC_HIGH_MARGIN_ADVISORIES,
        "Total number of sure-bets flagged with an unusually high margin"
    );
    describe_counter!(
        METRIC_INVALID_RECORDS,
        "Total number of input records that could not be decoded"
    );

    debug!("Metrics initialized");
}

/// Install the Prometheus recorder and return a handle for rendering.
pub fn install_prometheus() -> Result<PrometheusHandle, String> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| e.to_string())?;
    init_metrics();
    Ok(handle)
}

/// Record the outcome and latency of one evaluation.
pub fn record_evaluation(result: &SurebetResult, start: Instant) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_EVALUATION_LATENCY).record(latency_ms);
    counter!(METRIC_MARKETS_EVALUATED).increment(1);

    if result.is_surebet {
        counter!(METRIC_SUREBETS_FOUND).increment(1);
    }
    if let Some(kind) = result.rejection {
        counter!(METRIC_MARKETS_REJECTED, "kind" => kind.to_string()).increment(1);
    }
    if result.advisory.is_some() {
        counter!(METRIC_HIGH_MARGIN_ADVISORIES).increment(1);
    }
}

/// Increment invalid records counter.
pub fn inc_invalid_records() {
    counter!(METRIC_INVALID_RECORDS).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitrage::RejectionKind;

    #[test]
    fn recording_without_recorder_is_a_no_op() {
        let result = SurebetResult::rejected(RejectionKind::MalformedOdds, "bad");
        record_evaluation(&result, Instant::now());
        inc_invalid_records();
    }
}
