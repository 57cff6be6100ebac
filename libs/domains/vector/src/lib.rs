//! Vector Domain Library
//!
//! Turns rows of a CSV file into embedded records in a vector database and
//! searches every collection with one embedded query.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  VectorService  │  ← ingestion, fan-out search, collection lifecycle
//! └───┬─────────┬───┘
//!     │         │
//! ┌───▼───────┐ ┌▼─────────────┐     ┌──────────────────┐
//! │ Ingest    │ │ SearchFanout │────►│     Embedder     │
//! │ Pipeline  │ └──────┬───────┘     │ throttle+timeout │
//! └───┬───────┘        │             └────────┬─────────┘
//!     │         ┌──────▼──────┐      ┌────────▼─────────┐
//!     └────────►│ VectorStore │      │ EmbeddingProvider│
//!               │   (trait)   │      │     (trait)      │
//!               └──────┬──────┘      └────────┬─────────┘
//!               ┌──────▼──────┐      ┌────────▼─────────┐
//!               │ MilvusStore │      │  OpenAIProvider  │
//!               │InMemoryStore│      └──────────────────┘
//!               └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use core_config::FromEnv;
//! use domain_vector::{
//!     Embedder, EmbeddingConfig, GovernorThrottle, IndexConfig, IngestConfig, MilvusConfig,
//!     MilvusStore, OpenAIConfig, OpenAIProvider, SearchConfig, VectorService,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let embedding = EmbeddingConfig::from_env()?;
//! let embedder = Embedder::new(
//!     Arc::new(OpenAIProvider::new(OpenAIConfig::from_env()?)?),
//!     Arc::new(GovernorThrottle::per_minute(embedding.requests_per_minute)),
//!     embedding.model,
//!     embedding.timeout,
//! );
//!
//! let service = VectorService::new(
//!     Arc::new(MilvusStore::new(MilvusConfig::from_env()?)?),
//!     embedder,
//!     IndexConfig::from_env()?,
//!     IngestConfig::from_env()?,
//!     SearchConfig::from_env()?,
//! );
//!
//! let summary = service.ingest().await?;
//! println!("inserted {} rows", summary.rows_inserted);
//!
//! for (collection, hits) in service.search("what is ownership?").await? {
//!     println!("{}: {} hits", collection, hits.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod collections;
pub mod config;
pub mod csv_source;
pub mod embedding;
pub mod error;
pub mod handlers;
pub mod ingest;
pub mod models;
pub mod rate_limit;
pub mod schema;
pub mod search;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use collections::CollectionManager;
pub use config::{EmbeddingConfig, IngestConfig, SearchConfig};
pub use csv_source::{CsvRowSource, RowSet};
pub use embedding::{Embedder, EmbeddingProvider, OpenAIConfig, OpenAIProvider};
pub use error::{VectorError, VectorResult};
pub use handlers::{VectorApiDoc, router};
pub use ingest::IngestPipeline;
pub use models::{
    CollectionHandle, CollectionSchema, DistanceMetric, EmbeddingModel, EmbeddingResult,
    FieldSchema, FieldType, IndexConfig, IndexType, IngestSummary, Row, RowOrder, SearchHit,
};
pub use rate_limit::{GovernorThrottle, RequestThrottle, Unthrottled};
pub use search::{SearchFanout, SearchResults, sort_hits};
pub use service::VectorService;
pub use store::{InMemoryStore, MilvusConfig, MilvusStore, Record, SearchRequest, VectorStore};
