//! Vector store abstraction and implementations.

mod config;
mod memory;
mod milvus;

pub use config::MilvusConfig;
pub use memory::InMemoryStore;
pub use milvus::MilvusStore;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::VectorResult;
use crate::models::{CollectionSchema, DistanceMetric, IndexConfig, SearchHit};

/// One record ready for insertion, keyed by field name.
pub type Record = Map<String, Value>;

/// Nearest-neighbour query against a single collection
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub vector: Vec<f32>,
    pub limit: usize,
    pub metric: DistanceMetric,
    /// Field projected into [`SearchHit::display`]
    pub output_field: String,
}

/// Administrative and data operations of a vector database.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn has_collection(&self, name: &str) -> VectorResult<bool>;

    async fn create_collection(&self, name: &str, schema: &CollectionSchema) -> VectorResult<()>;

    /// Schema of an existing collection.
    async fn describe_collection(&self, name: &str) -> VectorResult<CollectionSchema>;

    async fn create_index(
        &self,
        name: &str,
        vector_field: &str,
        index: &IndexConfig,
    ) -> VectorResult<()>;

    /// Inserts records, returning how many were written.
    async fn insert(&self, name: &str, records: Vec<Record>) -> VectorResult<usize>;

    /// Makes the collection searchable.
    async fn load_collection(&self, name: &str) -> VectorResult<()>;

    /// Metric of the collection's vector index, `None` when it has none.
    async fn index_metric(&self, name: &str) -> VectorResult<Option<DistanceMetric>>;

    /// Hits ordered nearest-first.
    async fn search(&self, name: &str, request: &SearchRequest) -> VectorResult<Vec<SearchHit>>;

    async fn drop_collection(&self, name: &str) -> VectorResult<()>;

    async fn list_collections(&self) -> VectorResult<Vec<String>>;
}
