//! Environment-driven settings for ingestion, embedding and search.

use core_config::{ConfigError, FromEnv, env_or_default, env_parse_or, env_parse_required, env_required};
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

use crate::csv_source::CsvRowSource;
use crate::models::{DistanceMetric, EmbeddingModel, IndexConfig, IndexType, RowOrder};
use crate::schema::TRUNCATION_MARKER;

/// Where rows come from and how they map onto a collection
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub csv_path: PathBuf,
    /// Collection name before sanitizing
    pub dataset_name: String,
    pub primary_key_column: String,
    pub text_column: String,
    pub vector_field: String,
    pub text_max_length: u32,
    /// `None` reads every row
    pub max_rows: Option<usize>,
    pub row_order: RowOrder,
    pub embed_concurrency: usize,
}

impl IngestConfig {
    pub fn new(csv_path: impl Into<PathBuf>, dataset_name: impl Into<String>) -> Self {
        Self {
            csv_path: csv_path.into(),
            dataset_name: dataset_name.into(),
            primary_key_column: "question_id".to_string(),
            text_column: "question".to_string(),
            vector_field: "embedding".to_string(),
            text_max_length: 256,
            max_rows: None,
            row_order: RowOrder::Sequential,
            embed_concurrency: 1,
        }
    }
}

impl FromEnv for IngestConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let csv_path = PathBuf::from(env_required("CSV_FILE_PATH")?);
        std::fs::File::open(&csv_path).map_err(|e| ConfigError::Invalid {
            key: "CSV_FILE_PATH".to_string(),
            details: format!("{}: {}", csv_path.display(), e),
        })?;

        let max_records: usize = env_parse_required("MAX_RECORDS")?;

        let dataset_name = match std::env::var("DATASET_NAME") {
            Ok(name) if !name.trim().is_empty() => name,
            _ => CsvRowSource::new(&csv_path)
                .dataset_name()
                .ok_or_else(|| ConfigError::Invalid {
                    key: "DATASET_NAME".to_string(),
                    details: "cannot derive a name from CSV_FILE_PATH".to_string(),
                })?,
        };

        let embed_concurrency: usize = env_parse_or("EMBED_CONCURRENCY", 1)?;
        if embed_concurrency == 0 {
            return Err(invalid("EMBED_CONCURRENCY", "must be at least 1"));
        }

        let text_max_length: u32 = env_parse_or("TEXT_MAX_LENGTH", 256)?;
        if text_max_length as usize <= TRUNCATION_MARKER.len() {
            return Err(invalid(
                "TEXT_MAX_LENGTH",
                &format!("must exceed {}", TRUNCATION_MARKER.len()),
            ));
        }

        Ok(Self {
            csv_path,
            dataset_name,
            primary_key_column: env_or_default("PRIMARY_KEY_COLUMN", "question_id"),
            text_column: env_or_default("EMBED_TEXT_COLUMN", "question"),
            vector_field: env_or_default("VECTOR_FIELD", "embedding"),
            text_max_length,
            max_rows: (max_records > 0).then_some(max_records),
            row_order: env_parse_or("ROW_ORDER", RowOrder::Sequential)?,
            embed_concurrency,
        })
    }
}

/// Embedding model, pacing and timeout
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub model: EmbeddingModel,
    pub requests_per_minute: NonZeroU32,
    pub timeout: Duration,
}

impl FromEnv for EmbeddingConfig {
    /// - OPENAI_ENGINE: required
    /// - EMBEDDING_DIMENSION: optional for known models
    /// - EMBED_REQUESTS_PER_MINUTE: defaults to 60
    /// - REQUEST_TIMEOUT_SECS: defaults to 30
    fn from_env() -> Result<Self, ConfigError> {
        let engine = env_required("OPENAI_ENGINE")?;
        let dimension: Option<u32> = match std::env::var("EMBEDDING_DIMENSION") {
            Ok(raw) if !raw.trim().is_empty() => Some(env_parse_required("EMBEDDING_DIMENSION")?),
            _ => None,
        };
        let model = EmbeddingModel::new(engine, dimension)
            .map_err(|e| invalid("OPENAI_ENGINE", &e.to_string()))?;

        let requests_per_minute = NonZeroU32::new(env_parse_or("EMBED_REQUESTS_PER_MINUTE", 60)?)
            .ok_or_else(|| invalid("EMBED_REQUESTS_PER_MINUTE", "must be at least 1"))?;

        let timeout = Duration::from_secs(env_parse_or("REQUEST_TIMEOUT_SECS", 30)?);

        Ok(Self {
            model,
            requests_per_minute,
            timeout,
        })
    }
}

/// Fan-out search options
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub top_k: usize,
    /// Keep collections with no hits in the response
    pub include_empty: bool,
    pub concurrency: usize,
    /// Fallback for collections that have no index
    pub metric: DistanceMetric,
    pub display_field: String,
    /// Per-collection query timeout
    pub timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            include_empty: true,
            concurrency: 4,
            metric: DistanceMetric::L2,
            display_field: "question".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl FromEnv for SearchConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let top_k: usize = env_parse_or("SEARCH_TOP_K", defaults.top_k)?;
        if top_k == 0 {
            return Err(invalid("SEARCH_TOP_K", "must be at least 1"));
        }
        let concurrency: usize = env_parse_or("SEARCH_CONCURRENCY", defaults.concurrency)?;
        if concurrency == 0 {
            return Err(invalid("SEARCH_CONCURRENCY", "must be at least 1"));
        }

        let text_column = env_or_default("EMBED_TEXT_COLUMN", &defaults.display_field);

        Ok(Self {
            top_k,
            include_empty: env_parse_or("SEARCH_INCLUDE_EMPTY", defaults.include_empty)?,
            concurrency,
            metric: env_parse_or("METRIC_TYPE", defaults.metric)?,
            display_field: env_or_default("DISPLAY_FIELD", &text_column),
            timeout: Duration::from_secs(env_parse_or("REQUEST_TIMEOUT_SECS", 30)?),
        })
    }
}

impl FromEnv for IndexConfig {
    /// - INDEX_TYPE: IVF_FLAT (default), FLAT or HNSW
    /// - METRIC_TYPE: L2 (default), IP or COSINE
    /// - INDEX_NLIST: defaults to 1024
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = IndexConfig::default();
        Ok(Self {
            index_type: env_parse_or::<IndexType>("INDEX_TYPE", defaults.index_type)?,
            metric: env_parse_or("METRIC_TYPE", defaults.metric)?,
            nlist: env_parse_or("INDEX_NLIST", defaults.nlist)?,
        })
    }
}

fn invalid(key: &str, details: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        details: details.to_string(),
    }
}
