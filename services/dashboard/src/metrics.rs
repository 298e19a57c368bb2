//! Prometheus metrics exposition
//!
//! Metric names:
//!
//! - `dashboard_requests_total` (counter): labels `status`, `method`
//! - `dashboard_request_duration_seconds` (histogram): label `status`
//! - `dashboard_upstream_errors_total` (counter): label `error_type`
//! - `session_token_refreshes_total` (counter, recorded by the session
//!   layer): label `outcome`

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return a handle for rendering metrics.
///
/// Configures `dashboard_request_duration_seconds` with histogram buckets so
/// it renders as a Prometheus histogram (with `_bucket` lines for
/// `histogram_quantile()` queries) rather than the default summary. Bucket
/// boundaries cover 5ms to 60s, the plausible range for a round-trip that
/// may include an inline token refresh.
pub fn install_recorder() -> PrometheusHandle {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            metrics_exporter_prometheus::Matcher::Full(
                "dashboard_request_duration_seconds".to_string(),
            ),
            &[
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
            ],
        )
        .expect("failed to set histogram buckets")
        .install_recorder()
        .expect("failed to install Prometheus recorder")
}

/// Record a completed request with status code and HTTP method labels.
pub fn record_request(status: u16, method: &str, duration_secs: f64) {
    let status_str = status.to_string();
    metrics::counter!("dashboard_requests_total", "status" => status_str.clone(), "method" => method.to_string())
        .increment(1);
    metrics::histogram!("dashboard_request_duration_seconds", "status" => status_str)
        .record(duration_secs);
}

/// Record an upstream (provider-side) error with a classification label.
pub fn record_upstream_error(error_type: &str) {
    metrics::counter!("dashboard_upstream_errors_total", "error_type" => error_type.to_string())
        .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusRecorder;

    #[test]
    fn record_functions_do_not_panic_without_recorder() {
        // When no recorder is installed, metrics calls are no-ops.
        record_request(200, "GET", 0.05);
        record_upstream_error("transport");
    }

    /// Create an isolated recorder/handle pair for unit tests. Using
    /// build_recorder() avoids the global-recorder singleton constraint.
    fn isolated_recorder() -> (PrometheusRecorder, PrometheusHandle) {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                metrics_exporter_prometheus::Matcher::Full(
                    "dashboard_request_duration_seconds".to_string(),
                ),
                &[
                    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
                ],
            )
            .expect("failed to set histogram buckets")
            .build_recorder();
        let handle = recorder.handle();
        (recorder, handle)
    }

    #[test]
    fn record_request_increments_counter_and_histogram() {
        let (recorder, handle) = isolated_recorder();
        let _guard = metrics::set_default_local_recorder(&recorder);

        record_request(200, "GET", 0.042);
        record_request(502, "POST", 1.5);

        let output = handle.render();
        assert!(output.contains("dashboard_requests_total"));
        assert!(output.contains("status=\"200\""));
        assert!(output.contains("method=\"GET\""));
        assert!(output.contains("status=\"502\""));
        assert!(
            output.contains("dashboard_request_duration_seconds_bucket"),
            "histogram must render _bucket lines for histogram_quantile() queries"
        );
    }

    #[test]
    fn record_upstream_error_carries_error_type_label() {
        let (recorder, handle) = isolated_recorder();
        let _guard = metrics::set_default_local_recorder(&recorder);

        record_upstream_error("status");
        record_upstream_error("transport");

        let output = handle.render();
        assert!(output.contains("dashboard_upstream_errors_total"));
        assert!(output.contains("error_type=\"status\""));
        assert!(output.contains("error_type=\"transport\""));
    }
}
