// Prometheus metrics exposed at GET /metrics
use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter_vec, Encoder, Histogram, IntCounterVec, TextEncoder,
};
use verdict_common::types::{Language, TestCaseResult};

lazy_static! {
    pub static ref SUBMISSIONS_GRADED: IntCounterVec = register_int_counter_vec!(
        "verdict_submissions_graded_total",
        "Submissions graded, by language",
        &["language"]
    )
    .unwrap();
    pub static ref TEST_CASES_EXECUTED: IntCounterVec = register_int_counter_vec!(
        "verdict_test_cases_executed_total",
        "Test cases executed, by final status",
        &["status"]
    )
    .unwrap();
    pub static ref GRADING_DURATION: Histogram = register_histogram!(
        "verdict_grading_duration_seconds",
        "Wall time of a grading run",
        vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]
    )
    .unwrap();
}

pub fn record_results(results: &[TestCaseResult]) {
    for result in results {
        TEST_CASES_EXECUTED
            .with_label_values(&[result.status.as_str()])
            .inc();
    }
}

pub fn record_graded(language: Language) {
    SUBMISSIONS_GRADED
        .with_label_values(&[language.as_str()])
        .inc();
}

/// Render the default registry in the text exposition format.
pub fn render() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
