//! Prometheus export for HTTP and classifier metrics.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

const INFERENCE_DURATION: &str = "classifier_inference_duration_seconds";
const INFERENCE_ERRORS: &str = "classifier_errors_total";

/// CPU BERT inference lands between tens of milliseconds and a few seconds.
const INFERENCE_BUCKETS: &[f64] = &[0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the process-wide Prometheus recorder.
///
/// Call once at startup, before any metrics are recorded.
pub fn init_metrics() -> anyhow::Result<()> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(INFERENCE_DURATION.to_string()),
            INFERENCE_BUCKETS,
        )?
        .install_recorder()?;

    METRICS_HANDLE
        .set(handle)
        .map_err(|_| anyhow::anyhow!("metrics recorder already initialized"))
}

/// Current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}

pub fn record_inference(model: &str, elapsed: Duration, success: bool) {
    let model = model.to_string();
    histogram!(INFERENCE_DURATION, "model" => model.clone()).record(elapsed.as_secs_f64());
    if !success {
        counter!(INFERENCE_ERRORS, "model" => model).increment(1);
    }
}
