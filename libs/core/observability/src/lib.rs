//! Observability utilities for the CSV search service.
//!
//! This crate provides:
//! - Prometheus metrics recording and export
//! - Pipeline metrics for ingestion, embedding and fan-out search
//! - Axum middleware for automatic request metrics
//!
//! # Example
//!
//! ```rust,ignore
//! use observability::{init_metrics, metrics_handler, PipelineMetrics};
//!
//! init_metrics();
//!
//! PipelineMetrics::record_row("inserted");
//! PipelineMetrics::record_embedding_request("ok");
//!
//! let app = Router::new()
//!     .route("/metrics", get(metrics_handler));
//! ```

pub mod middleware;
pub mod pipeline;

pub use middleware::metrics_middleware;
pub use pipeline::{PipelineMetrics, SearchTimer};

pub use metrics::{counter, gauge, histogram};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::{info, warn};

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Initialize the Prometheus metrics recorder.
///
/// Call once at application startup. Returns `None` when another global
/// recorder was installed first; metrics are then dropped and `/metrics`
/// renders a placeholder.
pub fn init_metrics() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE
        .get_or_try_init(|| {
            let handle = PrometheusBuilder::new().install_recorder()?;

            info!("Prometheus metrics recorder initialized");
            register_metric_descriptions();

            Ok::<_, metrics_exporter_prometheus::BuildError>(handle)
        })
        .inspect_err(|e| warn!("Failed to install Prometheus recorder: {}", e))
        .ok()
}

/// Get the metrics handle (must call init_metrics first)
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Axum handler for /metrics endpoint
pub async fn metrics_handler() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

fn register_metric_descriptions() {
    use metrics::describe_counter;
    use metrics::describe_histogram;

    // HTTP metrics
    describe_counter!("http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_counter!(
        "http_requests_errors_total",
        "Total number of HTTP request errors"
    );

    // Ingestion metrics
    describe_counter!("ingest_runs_total", "Ingestion runs by collection");
    describe_counter!(
        "ingest_rows_total",
        "Rows processed by outcome (inserted, skipped, failed)"
    );
    describe_histogram!(
        "ingest_duration_seconds",
        "Wall-clock duration of an ingestion run"
    );

    // Embedding metrics
    describe_counter!(
        "embedding_requests_total",
        "Embedding calls by status (ok, error, timeout, dimension_mismatch)"
    );

    // Search metrics
    describe_counter!("search_requests_total", "Fan-out search requests");
    describe_counter!(
        "search_collection_errors_total",
        "Per-collection search failures"
    );
    describe_histogram!(
        "search_duration_seconds",
        "Fan-out search duration in seconds"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_metrics_handler_renders_after_init() {
        init_metrics();
        PipelineMetrics::record_row("inserted");

        let body = metrics_handler().await;
        assert!(!body.is_empty());
    }
}
