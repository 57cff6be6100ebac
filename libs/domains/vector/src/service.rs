use std::sync::Arc;
use tracing::{info, warn};

use crate::collections::CollectionManager;
use crate::config::{IngestConfig, SearchConfig};
use crate::csv_source::CsvRowSource;
use crate::embedding::Embedder;
use crate::error::{VectorError, VectorResult};
use crate::ingest::IngestPipeline;
use crate::models::{IndexConfig, IngestSummary};
use crate::schema::build_schema;
use crate::search::{SearchFanout, SearchResults};
use crate::store::VectorStore;

/// Vector service behind the HTTP handlers
///
/// Ingests the configured CSV file into a collection named after the
/// dataset, searches every collection with one embedded term and manages
/// the collection lifecycle.
pub struct VectorService {
    collections: CollectionManager,
    pipeline: IngestPipeline,
    fanout: SearchFanout,
    ingest: IngestConfig,
}

impl VectorService {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Embedder,
        index: IndexConfig,
        ingest: IngestConfig,
        search: SearchConfig,
    ) -> Self {
        Self {
            collections: CollectionManager::new(store.clone(), index),
            pipeline: IngestPipeline::new(embedder.clone(), store.clone(), ingest.embed_concurrency),
            fanout: SearchFanout::new(embedder, store, search),
            ingest,
        }
    }

    pub fn ingest_config(&self) -> &IngestConfig {
        &self.ingest
    }

    // ===== Ingestion =====

    /// Reads the configured CSV file into its dataset collection.
    ///
    /// The collection is created and indexed on first use. Running this
    /// again appends the rows once more.
    pub async fn ingest(&self) -> VectorResult<IngestSummary> {
        let config = &self.ingest;
        let source = CsvRowSource::new(&config.csv_path);
        let (order, max_rows) = (config.row_order, config.max_rows);

        let rows = tokio::task::spawn_blocking(move || source.read(order, max_rows))
            .await
            .map_err(|e| VectorError::Internal(format!("CSV reader task failed: {}", e)))??;

        if !rows.header.iter().any(|c| c == &config.text_column) {
            warn!(
                column = %config.text_column,
                "Text column is not in the CSV header, every row will be skipped"
            );
        }

        let schema = build_schema(
            &rows.header,
            &config.primary_key_column,
            config.text_max_length,
            &config.vector_field,
            self.pipeline.embedder().dimension(),
        )?;

        let ensured = self
            .collections
            .ensure_collection(&config.dataset_name, &schema)
            .await?;

        info!(
            collection = ensured.handle.name(),
            created = ensured.created,
            rows = rows.rows.len(),
            "Starting ingestion"
        );

        let mut summary = self
            .pipeline
            .run(&ensured.handle, rows.rows, &config.text_column)
            .await?;
        summary.created = ensured.created;
        Ok(summary)
    }

    // ===== Search =====

    pub async fn search(&self, term: &str) -> VectorResult<SearchResults> {
        if term.trim().is_empty() {
            return Err(VectorError::Validation(
                "Query parameter 'q' is required.".to_string(),
            ));
        }
        self.fanout.search(term).await
    }

    // ===== Collection Management =====

    /// Drops a collection, failing with `CollectionNotFound` when absent.
    pub async fn delete_collection(&self, name: &str) -> VectorResult<()> {
        if self.collections.delete(name).await? {
            Ok(())
        } else {
            Err(VectorError::CollectionNotFound(name.to_string()))
        }
    }

    pub async fn list_collections(&self) -> VectorResult<Vec<String>> {
        self.collections.list().await
    }

    /// Cheap round trip to the vector store for readiness checks.
    pub async fn check_store(&self) -> VectorResult<()> {
        self.collections.store().list_collections().await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::MockEmbeddingProvider;
    use crate::models::{EmbeddingModel, EmbeddingResult};
    use crate::rate_limit::Unthrottled;
    use crate::store::InMemoryStore;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn service(store: Arc<InMemoryStore>, file: &NamedTempFile) -> VectorService {
        let mut provider = MockEmbeddingProvider::new();
        provider.expect_embed().returning(|_, text| {
            Ok(EmbeddingResult {
                values: vec![text.len() as f32, 0.0, 1.0],
                dimension: 3,
                tokens_used: 1,
            })
        });
        let embedder = Embedder::new(
            Arc::new(provider),
            Arc::new(Unthrottled),
            EmbeddingModel::new("test-model", Some(3)).unwrap(),
            Duration::from_secs(5),
        );

        VectorService::new(
            store,
            embedder,
            IndexConfig::default(),
            IngestConfig::new(file.path(), "My Questions"),
            SearchConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_ingest_creates_then_appends() {
        let file = csv("question_id,question,answer\n1,What is Rust?,A language\n2,Why?,Because\n");
        let store = Arc::new(InMemoryStore::new());
        let service = service(store.clone(), &file);

        let first = service.ingest().await.unwrap();
        assert!(first.created);
        assert_eq!(first.collection, "MyQuestions");
        assert_eq!(first.rows_inserted, 2);

        let second = service.ingest().await.unwrap();
        assert!(!second.created);
        assert_eq!(second.rows_inserted, 2);
        assert_eq!(store.count("MyQuestions").await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_ingest_requires_primary_key_column() {
        let file = csv("id,question\n1,What?\n");
        let service = service(Arc::new(InMemoryStore::new()), &file);

        assert!(matches!(
            service.ingest().await,
            Err(VectorError::Validation(_))
        ));
        assert!(service.list_collections().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_after_ingest() {
        let file = csv("question_id,question\n1,Short\n2,A much longer question\n");
        let service = service(Arc::new(InMemoryStore::new()), &file);
        service.ingest().await.unwrap();

        let results = service.search("Brief").await.unwrap();
        let hits = &results["MyQuestions"];
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].display, serde_json::json!("Short"));
    }

    #[tokio::test]
    async fn test_blank_search_term_is_rejected() {
        let file = csv("question_id,question\n");
        let service = service(Arc::new(InMemoryStore::new()), &file);

        assert!(matches!(
            service.search("  ").await,
            Err(VectorError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_collection() {
        let file = csv("question_id,question\n1,Hello\n");
        let service = service(Arc::new(InMemoryStore::new()), &file);
        service.ingest().await.unwrap();

        service.delete_collection("My Questions").await.unwrap();
        assert!(matches!(
            service.delete_collection("My Questions").await,
            Err(VectorError::CollectionNotFound(_))
        ));
        assert!(service.list_collections().await.unwrap().is_empty());
    }
}
