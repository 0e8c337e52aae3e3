//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use metagen_models::RequestStage;
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "metagen_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "metagen_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "metagen_http_requests_in_flight";

    // Pipeline metrics
    pub const METADATA_REQUESTS_TOTAL: &str = "metagen_metadata_requests_total";
    pub const STAGE_DURATION_SECONDS: &str = "metagen_stage_duration_seconds";
    pub const POLL_ATTEMPTS: &str = "metagen_poll_attempts";
    pub const DOWNLOAD_BYTES: &str = "metagen_download_bytes";
    pub const CLEANUP_FAILURES_TOTAL: &str = "metagen_cleanup_failures_total";
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

/// Record the outcome of a metadata request (`success` or an error kind).
pub fn record_metadata_outcome(outcome: &str) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::METADATA_REQUESTS_TOTAL, &labels).increment(1);
}

/// Record how long a pipeline stage took.
pub fn record_stage_duration(stage: RequestStage, duration_secs: f64) {
    let labels = [("stage", stage.as_str().to_string())];
    histogram!(names::STAGE_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record how many status checks a file needed.
pub fn record_poll_attempts(attempts: u32) {
    histogram!(names::POLL_ATTEMPTS).record(attempts as f64);
}

/// Record downloaded video size.
pub fn record_download_bytes(bytes: u64) {
    histogram!(names::DOWNLOAD_BYTES).record(bytes as f64);
}

/// Record a failed cleanup (`local` or `remote`).
pub fn record_cleanup_failure(target: &str) {
    let labels = [("target", target.to_string())];
    counter!(names::CLEANUP_FAILURES_TOTAL, &labels).increment(1);
}

/// Collapse unknown paths so scanners cannot blow up label cardinality.
fn path_label(path: &str) -> &str {
    match path {
        "/" | "/generate-video-metadata" | "/health" | "/metrics" => path,
        _ => "other",
    }
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = path_label(request.uri().path()).to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_label() {
        assert_eq!(path_label("/generate-video-metadata"), "/generate-video-metadata");
        assert_eq!(path_label("/wp-admin/setup.php"), "other");
    }
}
