//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Initialize the Prometheus metrics recorder.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "tpost_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "tpost_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "tpost_http_requests_in_flight";

    // Pipeline metrics
    pub const PIPELINE_RUNS_TOTAL: &str = "tpost_pipeline_runs_total";
    pub const PIPELINE_STAGE_FAILURES_TOTAL: &str = "tpost_pipeline_stage_failures_total";
    pub const IMAGES_UPLOADED_TOTAL: &str = "tpost_images_uploaded_total";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "tpost_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a finished pipeline run.
pub fn record_pipeline_run(outcome: &str) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::PIPELINE_RUNS_TOTAL, &labels).increment(1);
}

/// Record a fatal stage failure.
pub fn record_stage_failure(stage: &str) {
    let labels = [("stage", stage.to_string())];
    counter!(names::PIPELINE_STAGE_FAILURES_TOTAL, &labels).increment(1);
}

/// Record an uploaded header image.
pub fn record_image_uploaded() {
    counter!(names::IMAGES_UPLOADED_TOTAL).increment(1);
}

/// Record a rate limit hit.
pub fn record_rate_limit_hit(scope: &str) {
    let labels = [("scope", scope.to_string())];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    record_http_request(&method, &path, status, start.elapsed().as_secs_f64());

    response
}
