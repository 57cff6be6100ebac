//! REST handlers for ingestion, search and collection management

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::error::{VectorError, VectorResult};
use crate::models::{IngestSummary, SearchHit};
use crate::service::VectorService;

// ===== Request/Response DTOs =====

/// Query parameters for `/search`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Search term to embed
    pub q: Option<String>,
}

/// Query parameters for `/delete_collection`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteParams {
    pub collection_name: Option<String>,
}

/// Result of an ingestion run
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IngestResponse {
    pub message: String,
    pub summary: IngestSummary,
}

/// Hits keyed by collection name.
///
/// Each collection maps to a list of `{id, distance, display}` objects. Older
/// clients expecting `{collection: {term: [[id, score, title]]}}` must read
/// `results.<collection>[i].id`, `.distance` and `.display` instead.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchResponse {
    pub results: BTreeMap<String, Vec<SearchHit>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CollectionsListResponse {
    pub collections: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

// ===== Ingestion =====

/// Ingest the configured CSV file
///
/// Embeds every row and inserts it into the collection named after the
/// dataset. Responds 201 when the collection was created by this call.
#[utoipa::path(
    post,
    path = "/process_csv",
    tag = "ingestion",
    responses(
        (status = 201, description = "Collection created and rows inserted", body = IngestResponse),
        (status = 200, description = "Rows inserted into an existing collection", body = IngestResponse),
        (status = 500, description = "Input, embedding or vector store failure", body = axum_helpers::ErrorResponse)
    )
)]
pub async fn process_csv(
    State(service): State<Arc<VectorService>>,
) -> VectorResult<impl IntoResponse> {
    let summary = service.ingest().await?;

    let (status, message) = if summary.created {
        (
            StatusCode::CREATED,
            "File processed and data inserted into a new collection.",
        )
    } else {
        (
            StatusCode::OK,
            "File processed and data inserted into the existing collection.",
        )
    };

    Ok((
        status,
        Json(IngestResponse {
            message: message.to_string(),
            summary,
        }),
    ))
}

/// Ingest the configured CSV file (alias of `/process_csv`)
#[utoipa::path(
    post,
    path = "/create_and_store_data",
    tag = "ingestion",
    responses(
        (status = 201, description = "Collection created and rows inserted", body = IngestResponse),
        (status = 200, description = "Rows inserted into an existing collection", body = IngestResponse),
        (status = 500, description = "Input, embedding or vector store failure", body = axum_helpers::ErrorResponse)
    )
)]
pub async fn create_and_store_data(
    state: State<Arc<VectorService>>,
) -> VectorResult<impl IntoResponse> {
    process_csv(state).await
}

/// Ingest the configured CSV file (legacy alias of `/process_csv`)
#[utoipa::path(
    post,
    path = "/process_file",
    tag = "ingestion",
    responses(
        (status = 201, description = "Collection created and rows inserted", body = IngestResponse),
        (status = 200, description = "Rows inserted into an existing collection", body = IngestResponse),
        (status = 500, description = "Input, embedding or vector store failure", body = axum_helpers::ErrorResponse)
    )
)]
pub async fn process_file(state: State<Arc<VectorService>>) -> VectorResult<impl IntoResponse> {
    process_csv(state).await
}

// ===== Search =====

/// Search every collection
///
/// Every collection is queried with the metric of its own index and its hits
/// are listed nearest-first. The response shape differs from the legacy
/// `{collection: {term: [[id, score, title]]}}` format: the term is no longer
/// a key, and each hit is an object with `id`, `distance` and `display`.
#[utoipa::path(
    get,
    path = "/search",
    tag = "search",
    params(SearchParams),
    responses(
        (status = 200, description = "Top hits per collection", body = SearchResponse),
        (status = 400, description = "Missing or blank search term", body = axum_helpers::ErrorResponse),
        (status = 500, description = "Collections could not be listed", body = axum_helpers::ErrorResponse)
    )
)]
pub async fn search(
    State(service): State<Arc<VectorService>>,
    Query(params): Query<SearchParams>,
) -> VectorResult<Json<SearchResponse>> {
    let term = params.q.unwrap_or_default();
    let results = service.search(&term).await?;
    Ok(Json(SearchResponse { results }))
}

// ===== Collection Management =====

/// Delete a collection
#[utoipa::path(
    delete,
    path = "/delete_collection",
    tag = "collections",
    params(DeleteParams),
    responses(
        (status = 200, description = "Collection deleted", body = MessageResponse),
        (status = 400, description = "Missing or invalid collection name", body = axum_helpers::ErrorResponse),
        (status = 404, description = "Collection not found", body = axum_helpers::ErrorResponse),
        (status = 500, description = "Vector store failure", body = axum_helpers::ErrorResponse)
    )
)]
pub async fn delete_collection(
    State(service): State<Arc<VectorService>>,
    Query(params): Query<DeleteParams>,
) -> VectorResult<Json<MessageResponse>> {
    let name = params
        .collection_name
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| {
            VectorError::Validation("Query parameter 'collection_name' is required.".to_string())
        })?;

    service.delete_collection(&name).await?;

    Ok(Json(MessageResponse {
        message: format!("Collection '{}' deleted successfully.", name),
    }))
}

/// List all collections
#[utoipa::path(
    get,
    path = "/collections",
    tag = "collections",
    responses(
        (status = 200, description = "Collection names, sorted", body = CollectionsListResponse),
        (status = 500, description = "Vector store failure", body = axum_helpers::ErrorResponse)
    )
)]
pub async fn list_collections(
    State(service): State<Arc<VectorService>>,
) -> VectorResult<Json<CollectionsListResponse>> {
    let collections = service.list_collections().await?;
    Ok(Json(CollectionsListResponse { collections }))
}
