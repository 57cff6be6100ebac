//! Metrics for the ingestion pipeline and fan-out search.

use metrics::{counter, histogram};
use std::time::Instant;

/// Pipeline metrics recorder
pub struct PipelineMetrics;

impl PipelineMetrics {
    /// Record the start of an ingestion run
    pub fn record_ingest_started(collection: &str) {
        counter!("ingest_runs_total", "collection" => collection.to_string()).increment(1);
    }

    /// Record one processed row. `outcome` is `inserted`, `skipped` or `failed`.
    pub fn record_row(outcome: &'static str) {
        counter!("ingest_rows_total", "outcome" => outcome).increment(1);
    }

    /// Record a finished ingestion run
    pub fn record_ingest_completed(collection: &str, rows_inserted: usize, duration_secs: f64) {
        histogram!("ingest_duration_seconds", "collection" => collection.to_string())
            .record(duration_secs);

        tracing::info!(
            collection = collection,
            rows_inserted = rows_inserted,
            duration_secs = duration_secs,
            "Ingestion run completed"
        );
    }

    /// Record an embedding call result
    pub fn record_embedding_request(status: &'static str) {
        counter!("embedding_requests_total", "status" => status).increment(1);
    }

    /// Record a per-collection search failure
    pub fn record_search_collection_error(collection: &str) {
        counter!(
            "search_collection_errors_total",
            "collection" => collection.to_string()
        )
        .increment(1);
    }
}

/// Timer guard for a fan-out search.
///
/// Counts the request on creation and records the duration when `stop()`
/// is called or when dropped.
pub struct SearchTimer {
    start: Instant,
    stopped: bool,
}

impl SearchTimer {
    pub fn start() -> Self {
        counter!("search_requests_total").increment(1);
        Self {
            start: Instant::now(),
            stopped: false,
        }
    }

    /// Stop the timer and record the duration. Returns duration in milliseconds.
    pub fn stop(&mut self) -> u64 {
        if self.stopped {
            return 0;
        }
        self.stopped = true;

        let duration = self.start.elapsed();
        histogram!("search_duration_seconds").record(duration.as_secs_f64());

        duration.as_millis() as u64
    }
}

impl Drop for SearchTimer {
    fn drop(&mut self) {
        if !self.stopped {
            self.stop();
        }
    }
}
