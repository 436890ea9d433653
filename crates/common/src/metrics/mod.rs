//! Metrics and observability utilities
//!
//! Prometheus metrics with standardized naming conventions.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all CareerLens metrics
pub const METRICS_PREFIX: &str = "careerlens";

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Matching metrics
    describe_counter!(
        format!("{}_match_runs_total", METRICS_PREFIX),
        Unit::Count,
        "Total match-set computations"
    );

    describe_histogram!(
        format!("{}_match_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Match computation latency in seconds"
    );

    describe_gauge!(
        format!("{}_match_results_count", METRICS_PREFIX),
        Unit::Count,
        "Number of matches surviving threshold and top-k"
    );

    // Narrative metrics
    describe_counter!(
        format!("{}_narratives_generated_total", METRICS_PREFIX),
        Unit::Count,
        "Total narratives generated"
    );

    // Embedding worker metrics
    describe_counter!(
        format!("{}_embeddings_generated_total", METRICS_PREFIX),
        Unit::Count,
        "Total insight embeddings generated"
    );

    describe_counter!(
        format!("{}_embedding_failures_total", METRICS_PREFIX),
        Unit::Count,
        "Total embedding generation failures"
    );
}

/// Record a completed match computation
pub fn record_match_run(start: Instant, result_count: usize) {
    counter!(format!("{}_match_runs_total", METRICS_PREFIX)).increment(1);
    histogram!(format!("{}_match_duration_seconds", METRICS_PREFIX))
        .record(start.elapsed().as_secs_f64());
    metrics::gauge!(format!("{}_match_results_count", METRICS_PREFIX)).set(result_count as f64);
}

/// Record a generated narrative
pub fn record_narrative_generated() {
    counter!(format!("{}_narratives_generated_total", METRICS_PREFIX)).increment(1);
}

/// Record embedding worker outcomes
pub fn record_embeddings(generated: usize, failed: usize) {
    if generated > 0 {
        counter!(format!("{}_embeddings_generated_total", METRICS_PREFIX))
            .increment(generated as u64);
    }
    if failed > 0 {
        counter!(format!("{}_embedding_failures_total", METRICS_PREFIX)).increment(failed as u64);
    }
}
