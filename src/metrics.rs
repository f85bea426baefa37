//! Prometheus metrics for token issuance.

use once_cell::sync::Lazy;
use prometheus::{register_counter_vec, register_histogram_vec, CounterVec, HistogramVec};

/// Tokens issued counter.
pub static TOKENS_ISSUED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "jws_issuer_tokens_issued_total",
        "Total number of tokens issued",
        &["algorithm"]
    )
    .expect("Failed to register tokens_issued metric")
});

/// Issuance failures counter, labelled by error code.
pub static ISSUANCE_FAILURES: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "jws_issuer_issuance_failures_total",
        "Total number of failed token issuances",
        &["error_code"]
    )
    .expect("Failed to register issuance_failures metric")
});

/// End-to-end issuance latency histogram.
pub static ISSUANCE_LATENCY: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "jws_issuer_issuance_latency_seconds",
        "Token issuance latency in seconds",
        &["algorithm"],
        vec![0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register issuance_latency metric")
});

/// Record a successful issuance.
pub fn record_issued(algorithm: &str, elapsed_secs: f64) {
    TOKENS_ISSUED.with_label_values(&[algorithm]).inc();
    ISSUANCE_LATENCY
        .with_label_values(&[algorithm])
        .observe(elapsed_secs);
}

/// Record a failed issuance.
pub fn record_failure(error_code: &str) {
    ISSUANCE_FAILURES.with_label_values(&[error_code]).inc();
}
