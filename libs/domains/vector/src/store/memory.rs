//! Exact-search vector store kept in process memory.
//!
//! Mirrors the Milvus contract the service relies on: inserts must match the
//! schema field set, searches need a loaded collection and the index metric.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{Record, SearchRequest, VectorStore};
use crate::error::{VectorError, VectorResult};
use crate::models::{CollectionSchema, DistanceMetric, FieldType, IndexConfig, SearchHit};

#[derive(Debug)]
struct MemoryCollection {
    schema: CollectionSchema,
    index: Option<IndexConfig>,
    loaded: bool,
    records: Vec<Record>,
}

/// In-memory [`VectorStore`]
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RwLock<BTreeMap<String, MemoryCollection>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held by `name`.
    pub async fn count(&self, name: &str) -> VectorResult<usize> {
        let collections = self.collections.read().await;
        collections
            .get(name)
            .map(|c| c.records.len())
            .ok_or_else(|| VectorError::CollectionNotFound(name.to_string()))
    }
}

fn validate_record(schema: &CollectionSchema, record: &Record) -> VectorResult<()> {
    if record.len() != schema.fields.len() {
        return Err(VectorError::Store(format!(
            "record has {} fields, schema has {}",
            record.len(),
            schema.fields.len()
        )));
    }

    for field in &schema.fields {
        let value = record
            .get(&field.name)
            .ok_or_else(|| VectorError::Store(format!("missing field '{}'", field.name)))?;

        let valid = match field.field_type {
            FieldType::Int64 => value.is_i64(),
            FieldType::VarChar => value.as_str().is_some_and(|s| {
                field
                    .max_length
                    .is_none_or(|max| s.len() <= max as usize)
            }),
            FieldType::FloatVector => value.as_array().is_some_and(|values| {
                Some(values.len() as u32) == field.dimension && values.iter().all(Value::is_number)
            }),
        };

        if !valid {
            return Err(VectorError::Store(format!(
                "value for field '{}' does not match type {:?}",
                field.name, field.field_type
            )));
        }
    }

    Ok(())
}

fn as_vector(value: &Value) -> Vec<f32> {
    value
        .as_array()
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_f64)
                .map(|v| v as f32)
                .collect()
        })
        .unwrap_or_default()
}

fn score(metric: DistanceMetric, a: &[f32], b: &[f32]) -> f32 {
    match metric {
        DistanceMetric::L2 => a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum(),
        DistanceMetric::Ip => a.iter().zip(b).map(|(x, y)| x * y).sum(),
        DistanceMetric::Cosine => {
            let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
            let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
            let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm_a == 0.0 || norm_b == 0.0 {
                0.0
            } else {
                dot / (norm_a * norm_b)
            }
        }
    }
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn has_collection(&self, name: &str) -> VectorResult<bool> {
        Ok(self.collections.read().await.contains_key(name))
    }

    async fn create_collection(&self, name: &str, schema: &CollectionSchema) -> VectorResult<()> {
        let mut collections = self.collections.write().await;
        if collections.contains_key(name) {
            return Err(VectorError::Store(format!(
                "collection '{}' already exists",
                name
            )));
        }

        collections.insert(
            name.to_string(),
            MemoryCollection {
                schema: schema.clone(),
                index: None,
                loaded: false,
                records: Vec::new(),
            },
        );
        Ok(())
    }

    async fn describe_collection(&self, name: &str) -> VectorResult<CollectionSchema> {
        let collections = self.collections.read().await;
        collections
            .get(name)
            .map(|c| c.schema.clone())
            .ok_or_else(|| VectorError::CollectionNotFound(name.to_string()))
    }

    async fn create_index(
        &self,
        name: &str,
        vector_field: &str,
        index: &IndexConfig,
    ) -> VectorResult<()> {
        let mut collections = self.collections.write().await;
        let collection = collections
            .get_mut(name)
            .ok_or_else(|| VectorError::CollectionNotFound(name.to_string()))?;

        match collection.schema.field(vector_field) {
            Some(field) if field.field_type == FieldType::FloatVector => {
                collection.index = Some(*index);
                Ok(())
            }
            _ => Err(VectorError::Store(format!(
                "'{}' is not a vector field",
                vector_field
            ))),
        }
    }

    async fn insert(&self, name: &str, records: Vec<Record>) -> VectorResult<usize> {
        let mut collections = self.collections.write().await;
        let collection = collections
            .get_mut(name)
            .ok_or_else(|| VectorError::CollectionNotFound(name.to_string()))?;

        for record in &records {
            validate_record(&collection.schema, record)?;
        }

        let count = records.len();
        collection.records.extend(records);
        Ok(count)
    }

    async fn load_collection(&self, name: &str) -> VectorResult<()> {
        let mut collections = self.collections.write().await;
        let collection = collections
            .get_mut(name)
            .ok_or_else(|| VectorError::CollectionNotFound(name.to_string()))?;

        if collection.index.is_none() {
            return Err(VectorError::Store(format!(
                "collection '{}' has no index",
                name
            )));
        }
        collection.loaded = true;
        Ok(())
    }

    async fn index_metric(&self, name: &str) -> VectorResult<Option<DistanceMetric>> {
        let collections = self.collections.read().await;
        collections
            .get(name)
            .map(|c| c.index.map(|index| index.metric))
            .ok_or_else(|| VectorError::CollectionNotFound(name.to_string()))
    }

    async fn search(&self, name: &str, request: &SearchRequest) -> VectorResult<Vec<SearchHit>> {
        let collections = self.collections.read().await;
        let collection = collections
            .get(name)
            .ok_or_else(|| VectorError::CollectionNotFound(name.to_string()))?;

        if !collection.loaded {
            return Err(VectorError::Store(format!(
                "collection '{}' is not loaded",
                name
            )));
        }
        if let Some(index) = collection.index {
            if index.metric != request.metric {
                return Err(VectorError::Store(format!(
                    "metric {} does not match index metric {}",
                    request.metric, index.metric
                )));
            }
        }

        let schema = &collection.schema;
        if schema.field(&request.output_field).is_none() {
            return Err(VectorError::Store(format!(
                "field '{}' does not exist",
                request.output_field
            )));
        }
        let (Some(primary), Some(vector_field)) = (schema.primary_field(), schema.vector_field())
        else {
            return Err(VectorError::Store("collection schema is incomplete".into()));
        };

        let mut hits: Vec<SearchHit> = collection
            .records
            .iter()
            .map(|record| SearchHit {
                id: record.get(&primary.name).cloned().unwrap_or(Value::Null),
                distance: score(
                    request.metric,
                    &request.vector,
                    &record.get(&vector_field.name).map(as_vector).unwrap_or_default(),
                ),
                display: record
                    .get(&request.output_field)
                    .cloned()
                    .unwrap_or(Value::Null),
            })
            .collect();

        crate::search::sort_hits(&mut hits, request.metric);
        hits.truncate(request.limit);
        Ok(hits)
    }

    async fn drop_collection(&self, name: &str) -> VectorResult<()> {
        self.collections
            .write()
            .await
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| VectorError::CollectionNotFound(name.to_string()))
    }

    async fn list_collections(&self) -> VectorResult<Vec<String>> {
        Ok(self.collections.read().await.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldSchema;
    use serde_json::json;

    fn schema() -> CollectionSchema {
        CollectionSchema::new(vec![
            FieldSchema::primary_int64("id"),
            FieldSchema::varchar("title", 16),
            FieldSchema::float_vector("embedding", 2),
        ])
        .unwrap()
    }

    fn record(id: i64, title: &str, v: [f32; 2]) -> Record {
        json!({ "id": id, "title": title, "embedding": v })
            .as_object()
            .cloned()
            .unwrap()
    }

    async fn ready_store(metric: DistanceMetric) -> InMemoryStore {
        let store = InMemoryStore::new();
        store.create_collection("books", &schema()).await.unwrap();
        let index = IndexConfig {
            metric,
            ..IndexConfig::default()
        };
        store.create_index("books", "embedding", &index).await.unwrap();
        store
            .insert(
                "books",
                vec![
                    record(1, "far", [10.0, 10.0]),
                    record(2, "near", [1.0, 0.0]),
                    record(3, "mid", [3.0, 3.0]),
                ],
            )
            .await
            .unwrap();
        store.load_collection("books").await.unwrap();
        store
    }

    fn request(metric: DistanceMetric, limit: usize) -> SearchRequest {
        SearchRequest {
            vector: vec![1.0, 0.0],
            limit,
            metric,
            output_field: "title".to_string(),
        }
    }

    #[tokio::test]
    async fn test_l2_search_is_ascending() {
        let store = ready_store(DistanceMetric::L2).await;
        let hits = store.search("books", &request(DistanceMetric::L2, 5)).await.unwrap();

        let titles: Vec<_> = hits.iter().map(|h| h.display.clone()).collect();
        assert_eq!(titles, vec![json!("near"), json!("mid"), json!("far")]);
        assert_eq!(hits[0].id, json!(2));
        assert_eq!(hits[0].distance, 0.0);
    }

    #[tokio::test]
    async fn test_ip_search_is_descending_and_limited() {
        let store = ready_store(DistanceMetric::Ip).await;
        let hits = store.search("books", &request(DistanceMetric::Ip, 2)).await.unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].display, json!("far"));
        assert!(hits[0].distance >= hits[1].distance);
    }

    #[tokio::test]
    async fn test_index_metric() {
        let store = ready_store(DistanceMetric::Cosine).await;
        assert_eq!(
            store.index_metric("books").await.unwrap(),
            Some(DistanceMetric::Cosine)
        );

        store.create_collection("authors", &schema()).await.unwrap();
        assert_eq!(store.index_metric("authors").await.unwrap(), None);
        assert!(matches!(
            store.index_metric("missing").await,
            Err(VectorError::CollectionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_insert_rejects_mismatched_record() {
        let store = InMemoryStore::new();
        store.create_collection("books", &schema()).await.unwrap();

        let bad = json!({ "id": "x", "title": "t", "embedding": [0.0, 0.0] })
            .as_object()
            .cloned()
            .unwrap();
        assert!(matches!(
            store.insert("books", vec![bad]).await,
            Err(VectorError::Store(_))
        ));

        let too_long = record(1, "a title that is far too long", [0.0, 0.0]);
        assert!(store.insert("books", vec![too_long]).await.is_err());
        assert_eq!(store.count("books").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_search_requires_loaded_collection() {
        let store = InMemoryStore::new();
        store.create_collection("books", &schema()).await.unwrap();

        assert!(matches!(
            store.search("books", &request(DistanceMetric::L2, 5)).await,
            Err(VectorError::Store(_))
        ));
    }

    #[tokio::test]
    async fn test_drop_and_list() {
        let store = ready_store(DistanceMetric::L2).await;
        store.create_collection("authors", &schema()).await.unwrap();

        assert_eq!(store.list_collections().await.unwrap(), vec!["authors", "books"]);
        store.drop_collection("books").await.unwrap();
        assert_eq!(store.list_collections().await.unwrap(), vec!["authors"]);
        assert!(matches!(
            store.drop_collection("books").await,
            Err(VectorError::CollectionNotFound(_))
        ));
    }

    #[test]
    fn test_cosine_score_of_zero_vector() {
        assert_eq!(score(DistanceMetric::Cosine, &[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((score(DistanceMetric::Cosine, &[2.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    }
}
