//! Prometheus metrics exposition
//!
//! - `auth_requests_total` (counter): labels `endpoint`, `status`
//! - `auth_request_duration_seconds` (histogram): label `endpoint`
//! - `provider_errors_total` (counter): label `operation`

use std::sync::atomic::Ordering;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::handlers::AppState;

/// Install the Prometheus recorder and return a handle for rendering metrics.
///
/// Configures `auth_request_duration_seconds` with explicit buckets so it
/// renders as a Prometheus histogram (with `_bucket` lines) rather than the
/// default summary. Boundaries cover 5ms to 30s — the upper end bounded by
/// the provider call timeout.
pub fn install_recorder() -> PrometheusHandle {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            metrics_exporter_prometheus::Matcher::Full(
                "auth_request_duration_seconds".to_string(),
            ),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0],
        )
        .expect("failed to set histogram buckets")
        .install_recorder()
        .expect("failed to install Prometheus recorder")
}

/// Record a completed request with endpoint and status labels.
pub fn record_request(endpoint: &str, status: u16, duration_secs: f64) {
    let endpoint = endpoint.to_string();
    metrics::counter!("auth_requests_total", "endpoint" => endpoint.clone(), "status" => status.to_string())
        .increment(1);
    metrics::histogram!("auth_request_duration_seconds", "endpoint" => endpoint)
        .record(duration_secs);
}

/// Middleware recording a counter and latency sample for every request,
/// plus the running total reported by the health endpoint.
pub async fn track_request(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let endpoint = request.uri().path().to_owned();
    let start = Instant::now();
    let response = next.run(request).await;
    state.requests_served.fetch_add(1, Ordering::Relaxed);
    record_request(
        &endpoint,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );
    response
}

/// Record a failed identity provider call with the operation label.
pub fn record_provider_error(operation: &'static str) {
    metrics::counter!("provider_errors_total", "operation" => operation).increment(1);
}
