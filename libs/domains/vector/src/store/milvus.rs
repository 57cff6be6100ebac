//! Milvus v2 REST API client.
//!
//! Every endpoint is a `POST /v2/vectordb/...` returning
//! `{"code": 0, "data": ..., "message": ...}`; a non-zero code is a failure.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::{MilvusConfig, Record, SearchRequest, VectorStore};
use crate::error::{VectorError, VectorResult};
use crate::models::{
    CollectionSchema, DistanceMetric, FieldSchema, FieldType, IndexConfig, IndexType, SearchHit,
};

/// Milvus REST API response wrapper
#[derive(Debug, Deserialize)]
struct MilvusResponse<T> {
    code: i32,
    data: Option<T>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HasCollection {
    has: bool,
}

#[derive(Debug, Deserialize)]
struct InsertResult {
    #[serde(rename = "insertCount", default)]
    insert_count: usize,
}

#[derive(Debug, Deserialize)]
struct DescribeCollection {
    #[serde(default)]
    fields: Vec<DescribedField>,
}

#[derive(Debug, Deserialize)]
struct DescribedField {
    name: String,
    #[serde(rename = "type")]
    data_type: String,
    #[serde(rename = "primaryKey", default)]
    primary_key: bool,
    #[serde(default)]
    params: Vec<FieldParam>,
}

#[derive(Debug, Deserialize)]
struct DescribedIndex {
    #[serde(rename = "metricType", default)]
    metric_type: String,
}

#[derive(Debug, Deserialize)]
struct FieldParam {
    key: String,
    value: Value,
}

impl DescribedField {
    fn param(&self, key: &str) -> Option<u32> {
        self.params
            .iter()
            .find(|p| p.key == key)
            .and_then(|p| match &p.value {
                Value::String(s) => s.parse().ok(),
                Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
                _ => None,
            })
    }

    fn into_field_schema(self) -> VectorResult<FieldSchema> {
        let field_type = match self.data_type.as_str() {
            "Int64" => FieldType::Int64,
            "VarChar" => FieldType::VarChar,
            "FloatVector" => FieldType::FloatVector,
            other => {
                return Err(VectorError::Store(format!(
                    "field '{}' has unsupported type '{}'",
                    self.name, other
                )));
            }
        };

        Ok(FieldSchema {
            max_length: self.param("max_length"),
            dimension: self.param("dim"),
            is_primary: self.primary_key,
            field_type,
            name: self.name,
        })
    }
}

/// Vector store backed by a Milvus server
#[derive(Clone)]
pub struct MilvusStore {
    client: Arc<Client>,
    base_url: String,
    config: MilvusConfig,
}

impl MilvusStore {
    pub fn new(config: MilvusConfig) -> VectorResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VectorError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
            base_url: config.base_url(),
            config,
        })
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, mut body: Value) -> VectorResult<Option<T>> {
        if let (Some(db), Value::Object(map)) = (&self.config.database, &mut body) {
            map.insert("dbName".to_string(), json!(db));
        }

        let url = format!("{}/v2/vectordb/{}", self.base_url, path);
        let mut request = self.client.post(&url).json(&body);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| VectorError::StoreUnavailable(format!("{}: {}", path, e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(VectorError::StoreUnavailable(format!(
                "{} returned {}: {}",
                path, status, text
            )));
        }

        let milvus_resp: MilvusResponse<T> = response
            .json()
            .await
            .map_err(|e| VectorError::Store(format!("{}: malformed response: {}", path, e)))?;

        if milvus_resp.code != 0 {
            return Err(VectorError::Store(format!(
                "{} failed with code {}: {}",
                path,
                milvus_resp.code,
                milvus_resp
                    .message
                    .unwrap_or_else(|| "Unknown error".to_string())
            )));
        }

        Ok(milvus_resp.data)
    }
}

fn field_to_json(field: &FieldSchema) -> Value {
    let mut params = serde_json::Map::new();
    if let Some(max_length) = field.max_length {
        params.insert("max_length".to_string(), json!(max_length.to_string()));
    }
    if let Some(dim) = field.dimension {
        params.insert("dim".to_string(), json!(dim.to_string()));
    }

    json!({
        "fieldName": field.name,
        "dataType": field.field_type,
        "isPrimary": field.is_primary,
        "elementTypeParams": params,
    })
}

fn index_params(index: &IndexConfig) -> Value {
    match index.index_type {
        IndexType::IvfFlat => json!({ "index_type": index.index_type.as_str(), "nlist": index.nlist }),
        IndexType::Flat => json!({ "index_type": index.index_type.as_str() }),
        IndexType::Hnsw => json!({ "index_type": index.index_type.as_str(), "M": 16, "efConstruction": 200 }),
    }
}

/// Splits a search result row into id, distance and display value.
///
/// The primary key comes back under its own field name; it is whichever key
/// is neither `distance` nor the projected field.
fn parse_hit(mut row: serde_json::Map<String, Value>, output_field: &str) -> VectorResult<SearchHit> {
    let distance = row
        .remove("distance")
        .and_then(|d| d.as_f64())
        .ok_or_else(|| VectorError::Store("search hit without distance".to_string()))?
        as f32;
    let display = row.remove(output_field).unwrap_or(Value::Null);
    let id = match row.remove("id") {
        Some(id) => id,
        None => row
            .into_iter()
            .next()
            .map(|(_, v)| v)
            .unwrap_or(Value::Null),
    };

    Ok(SearchHit {
        id,
        distance,
        display,
    })
}

#[async_trait]
impl VectorStore for MilvusStore {
    async fn has_collection(&self, name: &str) -> VectorResult<bool> {
        let data: Option<HasCollection> = self
            .post("collections/has", json!({ "collectionName": name }))
            .await?;
        Ok(data.is_some_and(|d| d.has))
    }

    async fn create_collection(&self, name: &str, schema: &CollectionSchema) -> VectorResult<()> {
        let fields: Vec<Value> = schema.fields.iter().map(field_to_json).collect();
        let body = json!({
            "collectionName": name,
            "schema": {
                "autoId": false,
                "enableDynamicField": false,
                "fields": fields,
            },
        });

        self.post::<Value>("collections/create", body).await?;
        info!(collection = name, fields = schema.fields.len(), "Created collection");
        Ok(())
    }

    async fn describe_collection(&self, name: &str) -> VectorResult<CollectionSchema> {
        let data: Option<DescribeCollection> = self
            .post("collections/describe", json!({ "collectionName": name }))
            .await?;
        let described =
            data.ok_or_else(|| VectorError::CollectionNotFound(name.to_string()))?;

        let fields = described
            .fields
            .into_iter()
            .map(DescribedField::into_field_schema)
            .collect::<VectorResult<Vec<_>>>()?;

        CollectionSchema::new(fields)
            .map_err(|e| VectorError::Store(format!("collection '{}': {}", name, e)))
    }

    async fn create_index(
        &self,
        name: &str,
        vector_field: &str,
        index: &IndexConfig,
    ) -> VectorResult<()> {
        let body = json!({
            "collectionName": name,
            "indexParams": [{
                "fieldName": vector_field,
                "indexName": vector_field,
                "metricType": index.metric,
                "params": index_params(index),
            }],
        });

        self.post::<Value>("indexes/create", body).await?;
        info!(
            collection = name,
            field = vector_field,
            index_type = index.index_type.as_str(),
            metric = index.metric.as_str(),
            "Created index"
        );
        Ok(())
    }

    async fn insert(&self, name: &str, records: Vec<Record>) -> VectorResult<usize> {
        let expected = records.len();
        let data: Option<InsertResult> = self
            .post(
                "entities/insert",
                json!({ "collectionName": name, "data": records }),
            )
            .await?;
        Ok(data.map_or(expected, |d| d.insert_count))
    }

    async fn load_collection(&self, name: &str) -> VectorResult<()> {
        self.post::<Value>("collections/load", json!({ "collectionName": name }))
            .await?;
        debug!(collection = name, "Loaded collection");
        Ok(())
    }

    /// Lists the collection's indexes and returns the metric of the first
    /// one that has a metric type (scalar indexes have none).
    async fn index_metric(&self, name: &str) -> VectorResult<Option<DistanceMetric>> {
        let index_names: Option<Vec<String>> = self
            .post("indexes/list", json!({ "collectionName": name }))
            .await?;

        for index_name in index_names.unwrap_or_default() {
            let described: Option<Vec<DescribedIndex>> = self
                .post(
                    "indexes/describe",
                    json!({ "collectionName": name, "indexName": index_name }),
                )
                .await?;

            let metric = described
                .unwrap_or_default()
                .into_iter()
                .map(|index| index.metric_type)
                .find(|metric| !metric.trim().is_empty());

            if let Some(metric) = metric {
                return metric.parse().map(Some).map_err(|_| {
                    VectorError::Store(format!(
                        "collection '{}' uses unsupported metric '{}'",
                        name, metric
                    ))
                });
            }
        }

        Ok(None)
    }

    async fn search(&self, name: &str, request: &SearchRequest) -> VectorResult<Vec<SearchHit>> {
        let body = json!({
            "collectionName": name,
            "data": [request.vector],
            "limit": request.limit,
            "outputFields": [request.output_field],
            "searchParams": { "metricType": request.metric },
        });

        let rows: Option<Vec<serde_json::Map<String, Value>>> =
            self.post("entities/search", body).await?;

        let mut hits = rows
            .unwrap_or_default()
            .into_iter()
            .map(|row| parse_hit(row, &request.output_field))
            .collect::<VectorResult<Vec<_>>>()?;

        crate::search::sort_hits(&mut hits, request.metric);
        Ok(hits)
    }

    async fn drop_collection(&self, name: &str) -> VectorResult<()> {
        self.post::<Value>("collections/drop", json!({ "collectionName": name }))
            .await?;
        info!(collection = name, "Dropped collection");
        Ok(())
    }

    async fn list_collections(&self) -> VectorResult<Vec<String>> {
        let data: Option<Vec<String>> = self.post("collections/list", json!({})).await?;
        let mut names = data.unwrap_or_default();
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DistanceMetric;

    #[test]
    fn test_field_to_json_uses_string_params() {
        let json = field_to_json(&FieldSchema::varchar("title", 256));
        assert_eq!(json["fieldName"], "title");
        assert_eq!(json["dataType"], "VarChar");
        assert_eq!(json["elementTypeParams"]["max_length"], "256");

        let json = field_to_json(&FieldSchema::float_vector("embedding", 512));
        assert_eq!(json["dataType"], "FloatVector");
        assert_eq!(json["elementTypeParams"]["dim"], "512");

        let json = field_to_json(&FieldSchema::primary_int64("id"));
        assert_eq!(json["isPrimary"], true);
    }

    #[test]
    fn test_index_params_per_type() {
        let config = IndexConfig::default();
        let params = index_params(&config);
        assert_eq!(params["index_type"], "IVF_FLAT");
        assert_eq!(params["nlist"], 1024);

        let flat = IndexConfig {
            index_type: IndexType::Flat,
            metric: DistanceMetric::Ip,
            nlist: 1,
        };
        assert!(index_params(&flat).get("nlist").is_none());
    }

    #[test]
    fn test_describe_parses_field_params() {
        let raw = json!({
            "name": "embedding",
            "type": "FloatVector",
            "primaryKey": false,
            "params": [{ "key": "dim", "value": "512" }]
        });
        let field: DescribedField = serde_json::from_value(raw).unwrap();
        let schema = field.into_field_schema().unwrap();
        assert_eq!(schema.field_type, FieldType::FloatVector);
        assert_eq!(schema.dimension, Some(512));
    }

    #[test]
    fn test_parse_hit_uses_primary_key_field() {
        let row = json!({ "question_id": 7, "distance": 0.25, "question": "Why?" });
        let hit = parse_hit(row.as_object().cloned().unwrap(), "question").unwrap();
        assert_eq!(hit.id, json!(7));
        assert_eq!(hit.distance, 0.25);
        assert_eq!(hit.display, json!("Why?"));
    }

    #[test]
    fn test_parse_hit_requires_distance() {
        let row = json!({ "id": 1 });
        assert!(parse_hit(row.as_object().cloned().unwrap(), "title").is_err());
    }
}
