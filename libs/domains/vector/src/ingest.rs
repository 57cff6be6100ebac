//! Row-by-row ingestion: embed, convert, insert.

use futures::stream::{self, StreamExt};
use observability::PipelineMetrics;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::embedding::Embedder;
use crate::error::{VectorError, VectorResult};
use crate::models::{CollectionHandle, IngestSummary, Row};
use crate::schema::to_record;
use crate::store::VectorStore;

/// A row after the embedding step
enum Prepared {
    /// Line the CSV reader could not parse
    Unreadable(VectorError),
    /// No text to embed, or the embedder gave up
    Skipped(Row),
    Embedded(Row, Vec<f32>),
}

/// Feeds rows through the embedder into a collection.
#[derive(Clone)]
pub struct IngestPipeline {
    embedder: Embedder,
    store: Arc<dyn VectorStore>,
    concurrency: usize,
}

impl IngestPipeline {
    /// `concurrency` bounds the embedding requests in flight. Rows are
    /// always inserted in input order.
    pub fn new(embedder: Embedder, store: Arc<dyn VectorStore>, concurrency: usize) -> Self {
        Self {
            embedder,
            store,
            concurrency: concurrency.max(1),
        }
    }

    pub fn embedder(&self) -> &Embedder {
        &self.embedder
    }

    /// Ingests `rows` into `collection`, then loads it for search.
    ///
    /// Per-row problems are counted in the summary and never abort the run.
    /// Only a failing load of the collection is returned as an error.
    pub async fn run(
        &self,
        collection: &CollectionHandle,
        rows: Vec<VectorResult<Row>>,
        text_column: &str,
    ) -> VectorResult<IngestSummary> {
        let started = Instant::now();
        let name = collection.name();
        PipelineMetrics::record_ingest_started(name);

        let mut summary = IngestSummary {
            collection: name.to_string(),
            ..IngestSummary::default()
        };

        let mut prepared = stream::iter(rows)
            .map(|row| self.prepare(row, text_column))
            .buffered(self.concurrency);

        while let Some(item) = prepared.next().await {
            summary.rows_read += 1;

            let (row, vector) = match item {
                Prepared::Unreadable(e) => {
                    warn!(collection = name, error = %e, "Skipping unreadable row");
                    summary.rows_failed += 1;
                    PipelineMetrics::record_row("failed");
                    continue;
                }
                Prepared::Skipped(row) => {
                    debug!(collection = name, line = row.line(), "Row has no embedding");
                    summary.rows_skipped += 1;
                    PipelineMetrics::record_row("skipped");
                    continue;
                }
                Prepared::Embedded(row, vector) => (row, vector),
            };
            summary.rows_embedded += 1;

            let record = match to_record(&row, collection.schema(), vector) {
                Ok(record) => record,
                Err(e) => {
                    warn!(collection = name, line = row.line(), error = %e, "Row does not fit the collection schema");
                    summary.rows_failed += 1;
                    PipelineMetrics::record_row("failed");
                    continue;
                }
            };

            match self.store.insert(name, vec![record]).await {
                Ok(_) => {
                    summary.rows_inserted += 1;
                    PipelineMetrics::record_row("inserted");
                }
                Err(e) => {
                    warn!(collection = name, line = row.line(), error = %e, "Error inserting row");
                    summary.rows_failed += 1;
                    PipelineMetrics::record_row("failed");
                }
            }
        }

        self.store.load_collection(name).await?;

        PipelineMetrics::record_ingest_completed(
            name,
            summary.rows_inserted,
            started.elapsed().as_secs_f64(),
        );
        info!(
            collection = name,
            rows_read = summary.rows_read,
            rows_inserted = summary.rows_inserted,
            rows_skipped = summary.rows_skipped,
            rows_failed = summary.rows_failed,
            "Ingestion finished"
        );

        Ok(summary)
    }

    async fn prepare(&self, row: VectorResult<Row>, text_column: &str) -> Prepared {
        let row = match row {
            Ok(row) => row,
            Err(e) => return Prepared::Unreadable(e),
        };

        let text = match row.get(text_column) {
            Some(text) if !text.trim().is_empty() => text.to_string(),
            _ => return Prepared::Skipped(row),
        };

        match self.embedder.embed(&text).await {
            Some(vector) => Prepared::Embedded(row, vector),
            None => Prepared::Skipped(row),
        }
    }
}
