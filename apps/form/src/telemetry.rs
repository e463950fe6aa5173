use axum::http::StatusCode;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub fn init_telemetry() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    init_metrics();
}

fn init_metrics() {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("penguin_prediction_duration_seconds".to_string()),
            &[0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1],
        )
        .expect("valid histogram buckets")
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    PROMETHEUS_HANDLE
        .set(handle)
        .expect("metrics already initialized");

    metrics::describe_counter!(
        "penguin_predictions_total",
        "Form submissions by outcome (success or error kind)"
    );
    metrics::describe_histogram!(
        "penguin_prediction_duration_seconds",
        "Time spent validating, encoding, predicting and decoding one submission"
    );

    tracing::info!("Prometheus metrics initialized");
}

pub fn record_submission(outcome: &'static str, elapsed: Duration) {
    metrics::counter!("penguin_predictions_total", "outcome" => outcome).increment(1);
    metrics::histogram!("penguin_prediction_duration_seconds").record(elapsed.as_secs_f64());
}

pub async fn handler() -> impl IntoResponse {
    render(PROMETHEUS_HANDLE.get())
}

fn render(handle: Option<&PrometheusHandle>) -> (StatusCode, String) {
    match handle {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics not initialized".to_string(),
        ),
    }
}
