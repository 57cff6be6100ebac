//! Query every collection with one embedded search term.

use futures::stream::{self, StreamExt};
use observability::{PipelineMetrics, SearchTimer};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::SearchConfig;
use crate::embedding::Embedder;
use crate::error::{VectorError, VectorResult};
use crate::models::{DistanceMetric, SearchHit};
use crate::store::{SearchRequest, VectorStore};

/// Hits per collection, keyed by collection name
pub type SearchResults = BTreeMap<String, Vec<SearchHit>>;

/// Orders hits nearest-first for `metric`.
///
/// L2 distances sort ascending, inner product and cosine scores descending.
/// The sort is stable so equal scores keep the store's order.
pub fn sort_hits(hits: &mut [SearchHit], metric: DistanceMetric) {
    hits.sort_by(|a, b| {
        let ord = a
            .distance
            .partial_cmp(&b.distance)
            .unwrap_or_else(|| a.distance.total_cmp(&b.distance));
        if metric.is_ascending() { ord } else { ord.reverse() }
    });
}

/// Fans a search term out to all collections.
#[derive(Clone)]
pub struct SearchFanout {
    embedder: Embedder,
    store: Arc<dyn VectorStore>,
    config: SearchConfig,
}

impl SearchFanout {
    pub fn new(embedder: Embedder, store: Arc<dyn VectorStore>, config: SearchConfig) -> Self {
        Self {
            embedder,
            store,
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Embeds `term` once and returns the top hits of every collection.
    ///
    /// Failing to list collections is an error. Anything that goes wrong
    /// afterwards (embedding, a single collection query, a timeout) leaves
    /// an empty list for the affected collections.
    pub async fn search(&self, term: &str) -> VectorResult<SearchResults> {
        let _timer = SearchTimer::start();

        let names = self.store.list_collections().await?;
        if names.is_empty() {
            debug!("No collections to search");
            return Ok(SearchResults::new());
        }

        let Some(vector) = self.embedder.embed(term).await else {
            warn!(collections = names.len(), "Search term could not be embedded");
            return Ok(self.collect(names.into_iter().map(|name| (name, Vec::new()))));
        };

        let results: Vec<(String, Vec<SearchHit>)> = stream::iter(names)
            .map(|name| {
                let vector = &vector;
                async move {
                    let hits = self.search_collection(&name, vector).await;
                    (name, hits)
                }
            })
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

        let results = self.collect(results);
        info!(
            collections = results.len(),
            hits = results.values().map(Vec::len).sum::<usize>(),
            "Search completed"
        );
        Ok(results)
    }

    /// Queries one collection with the metric its index was built with.
    /// Collections without an index fall back to the configured metric.
    async fn search_collection(&self, name: &str, vector: &[f32]) -> Vec<SearchHit> {
        let query = async {
            let metric = self
                .store
                .index_metric(name)
                .await?
                .unwrap_or(self.config.metric);

            let request = SearchRequest {
                vector: vector.to_vec(),
                limit: self.config.top_k,
                metric,
                output_field: self.config.display_field.clone(),
            };
            let mut hits = self.store.search(name, &request).await?;
            sort_hits(&mut hits, metric);
            hits.truncate(request.limit);
            Ok::<_, VectorError>(hits)
        };

        match tokio::time::timeout(self.config.timeout, query).await {
            Ok(Ok(hits)) => hits,
            Ok(Err(e)) => {
                PipelineMetrics::record_search_collection_error(name);
                warn!(collection = name, error = %e, "Error searching collection");
                Vec::new()
            }
            Err(_) => {
                PipelineMetrics::record_search_collection_error(name);
                warn!(collection = name, timeout = ?self.config.timeout, "Collection search timed out");
                Vec::new()
            }
        }
    }

    fn collect(&self, results: impl IntoIterator<Item = (String, Vec<SearchHit>)>) -> SearchResults {
        results
            .into_iter()
            .filter(|(_, hits)| self.config.include_empty || !hits.is_empty())
            .collect()
    }
}

impl std::fmt::Debug for SearchFanout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchFanout")
            .field("model", &self.embedder.model().model_name())
            .field("config", &self.config)
            .finish()
    }
}
