//! Churn Service Metrics
//!
//! Prometheus metrics for HTTP traffic, scoring and record generation

use actix_web::HttpResponse;
use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter, register_int_counter_vec,
    Encoder, Histogram, HistogramVec, IntCounter, IntCounterVec, TextEncoder,
};
use std::time::Duration;

static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "churn_service_http_requests_total",
        "Total HTTP requests handled by churn-service",
        &["method", "path", "status"]
    )
    .expect("Failed to register churn_service_http_requests_total")
});

static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "churn_service_http_request_duration_seconds",
        "HTTP request latencies for churn-service",
        &["method", "path", "status"],
        vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register churn_service_http_request_duration_seconds")
});

static PREDICTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "churn_service_predictions_total",
        "Prediction requests by outcome (churn/retain/schema_error/scoring_error)",
        &["outcome"]
    )
    .expect("Failed to register churn_service_predictions_total")
});

static SCORING_DURATION_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "churn_service_scoring_duration_seconds",
        "Time spent in the model for one record",
        vec![0.00005, 0.0001, 0.00025, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.05]
    )
    .expect("Failed to register churn_service_scoring_duration_seconds")
});

static GENERATED_RECORDS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "churn_service_generated_records_total",
        "Synthetic feature records served"
    )
    .expect("Failed to register churn_service_generated_records_total")
});

/// Record one finished HTTP request
pub fn observe_http_request(method: &str, path: &str, status: u16, elapsed: Duration) {
    let status = status.to_string();
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path, &status])
        .observe(elapsed.as_secs_f64());
}

/// Record prediction outcome
pub fn record_prediction(outcome: &str) {
    PREDICTIONS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn observe_scoring(elapsed: Duration) {
    SCORING_DURATION_SECONDS.observe(elapsed.as_secs_f64());
}

pub fn record_generated() {
    GENERATED_RECORDS_TOTAL.inc();
}

/// GET /metrics
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Metrics encoding failed: {}", err);
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
