use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::{VectorError, VectorResult};

/// One CSV record: column name to raw text, in header order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    line: u64,
    values: Vec<(String, String)>,
}

impl Row {
    pub fn new(line: u64, values: Vec<(String, String)>) -> Self {
        Self { line, values }
    }

    /// 1-based line of the record in its source file.
    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Field data types understood by the vector store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum FieldType {
    Int64,
    VarChar,
    FloatVector,
}

/// A single field of a collection schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldSchema {
    pub name: String,
    pub field_type: FieldType,
    pub max_length: Option<u32>,
    pub dimension: Option<u32>,
    pub is_primary: bool,
}

impl FieldSchema {
    pub fn primary_int64(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Int64,
            max_length: None,
            dimension: None,
            is_primary: true,
        }
    }

    pub fn varchar(name: impl Into<String>, max_length: u32) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::VarChar,
            max_length: Some(max_length),
            dimension: None,
            is_primary: false,
        }
    }

    pub fn float_vector(name: impl Into<String>, dimension: u32) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::FloatVector,
            max_length: None,
            dimension: Some(dimension),
            is_primary: false,
        }
    }
}

/// Ordered field list of a collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CollectionSchema {
    pub fields: Vec<FieldSchema>,
}

impl CollectionSchema {
    /// Builds a schema, checking it has exactly one primary field and
    /// exactly one vector field.
    pub fn new(fields: Vec<FieldSchema>) -> VectorResult<Self> {
        let primaries = fields.iter().filter(|f| f.is_primary).count();
        if primaries != 1 {
            return Err(VectorError::Validation(format!(
                "schema must have exactly one primary field, found {}",
                primaries
            )));
        }

        let vectors = fields
            .iter()
            .filter(|f| f.field_type == FieldType::FloatVector)
            .count();
        if vectors != 1 {
            return Err(VectorError::Validation(format!(
                "schema must have exactly one vector field, found {}",
                vectors
            )));
        }

        Ok(Self { fields })
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn primary_field(&self) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.is_primary)
    }

    pub fn vector_field(&self) -> Option<&FieldSchema> {
        self.fields
            .iter()
            .find(|f| f.field_type == FieldType::FloatVector)
    }
}

/// Distance metric for similarity calculations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum DistanceMetric {
    /// Euclidean distance, smaller is closer
    #[default]
    #[serde(rename = "L2")]
    L2,
    /// Inner product, larger is closer
    #[serde(rename = "IP")]
    Ip,
    /// Cosine similarity, larger is closer
    #[serde(rename = "COSINE")]
    Cosine,
}

impl DistanceMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::L2 => "L2",
            DistanceMetric::Ip => "IP",
            DistanceMetric::Cosine => "COSINE",
        }
    }

    /// Whether nearest-first means ascending scores.
    pub fn is_ascending(&self) -> bool {
        matches!(self, DistanceMetric::L2)
    }
}

impl FromStr for DistanceMetric {
    type Err = VectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L2" => Ok(DistanceMetric::L2),
            "IP" => Ok(DistanceMetric::Ip),
            "COSINE" => Ok(DistanceMetric::Cosine),
            other => Err(VectorError::Validation(format!(
                "unknown metric type '{}', expected L2, IP or COSINE",
                other
            ))),
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Similarity index kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum IndexType {
    #[default]
    #[serde(rename = "IVF_FLAT")]
    IvfFlat,
    #[serde(rename = "FLAT")]
    Flat,
    #[serde(rename = "HNSW")]
    Hnsw,
}

impl IndexType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexType::IvfFlat => "IVF_FLAT",
            IndexType::Flat => "FLAT",
            IndexType::Hnsw => "HNSW",
        }
    }
}

impl FromStr for IndexType {
    type Err = VectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IVF_FLAT" => Ok(IndexType::IvfFlat),
            "FLAT" => Ok(IndexType::Flat),
            "HNSW" => Ok(IndexType::Hnsw),
            other => Err(VectorError::Validation(format!(
                "unknown index type '{}', expected IVF_FLAT, FLAT or HNSW",
                other
            ))),
        }
    }
}

/// Similarity index configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IndexConfig {
    pub index_type: IndexType,
    pub metric: DistanceMetric,
    pub nlist: u32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            index_type: IndexType::IvfFlat,
            metric: DistanceMetric::L2,
            nlist: 1024,
        }
    }
}

/// A collection known to exist, with the schema it was created with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionHandle {
    name: String,
    schema: CollectionSchema,
}

impl CollectionHandle {
    pub fn new(name: impl Into<String>, schema: CollectionSchema) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &CollectionSchema {
        &self.schema
    }
}

/// Result of `ensure_collection`
#[derive(Debug, Clone)]
pub struct EnsuredCollection {
    pub handle: CollectionHandle,
    /// `false` when the collection already existed
    pub created: bool,
}

/// One nearest-neighbour match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SearchHit {
    /// Primary key of the matched record
    #[schema(value_type = Object)]
    pub id: serde_json::Value,
    pub distance: f32,
    /// Projected display field, `null` when the record has none
    #[schema(value_type = Object)]
    pub display: serde_json::Value,
}

/// Counters reported by one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IngestSummary {
    pub collection: String,
    pub created: bool,
    pub rows_read: usize,
    pub rows_embedded: usize,
    pub rows_inserted: usize,
    /// Rows with no embedding (empty text or embedding failure)
    pub rows_skipped: usize,
    /// Rows that could not be parsed, converted or inserted
    pub rows_failed: usize,
}

/// Order in which CSV rows are fed to the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RowOrder {
    #[default]
    Sequential,
    /// Uniform sample of up to `max_rows` rows, kept in file order
    Random,
}

impl FromStr for RowOrder {
    type Err = VectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(RowOrder::Sequential),
            "random" => Ok(RowOrder::Random),
            other => Err(VectorError::Validation(format!(
                "unknown row order '{}', expected sequential or random",
                other
            ))),
        }
    }
}

/// Embedding model and the vector length it produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingModel {
    name: String,
    dimension: u32,
    request_dimensions: bool,
}

impl EmbeddingModel {
    /// Resolves a model name and an optional requested dimension.
    ///
    /// Known OpenAI models have a native dimension; `text-embedding-3-*`
    /// models can be shortened by passing `dimensions`. Unknown models
    /// need an explicit dimension.
    pub fn new(name: impl Into<String>, dimension: Option<u32>) -> VectorResult<Self> {
        let name = name.into();
        let native = native_dimension(&name);

        match (native, dimension) {
            (_, Some(0)) => Err(VectorError::Validation(
                "embedding dimension must be greater than zero".to_string(),
            )),
            (Some(native), None) => Ok(Self {
                name,
                dimension: native,
                request_dimensions: false,
            }),
            (Some(native), Some(requested)) if requested == native => Ok(Self {
                name,
                dimension: native,
                request_dimensions: false,
            }),
            (Some(native), Some(requested)) => {
                if !name.starts_with("text-embedding-3") || requested > native {
                    return Err(VectorError::Validation(format!(
                        "model '{}' cannot produce {}-dimensional embeddings",
                        name, requested
                    )));
                }
                Ok(Self {
                    name,
                    dimension: requested,
                    request_dimensions: true,
                })
            }
            (None, Some(requested)) => Ok(Self {
                name,
                dimension: requested,
                request_dimensions: false,
            }),
            (None, None) => Err(VectorError::Validation(format!(
                "unknown embedding model '{}'; set EMBEDDING_DIMENSION",
                name
            ))),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.name
    }

    pub fn dimension(&self) -> u32 {
        self.dimension
    }

    /// Value for the `dimensions` request parameter, if the model must be shortened.
    pub fn requested_dimensions(&self) -> Option<u32> {
        self.request_dimensions.then_some(self.dimension)
    }
}

fn native_dimension(model: &str) -> Option<u32> {
    match model {
        "text-embedding-3-small" => Some(1536),
        "text-embedding-3-large" => Some(3072),
        "text-embedding-ada-002" => Some(1536),
        _ => None,
    }
}

/// Embedding result
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmbeddingResult {
    pub values: Vec<f32>,
    pub dimension: u32,
    pub tokens_used: u32,
}
