mod rest;

use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::models::{IngestSummary, SearchHit};
use crate::service::VectorService;

pub use rest::{
    CollectionsListResponse, DeleteParams, IngestResponse, MessageResponse, SearchParams,
    SearchResponse,
};

/// OpenAPI documentation for the vector API
#[derive(OpenApi)]
#[openapi(
    paths(
        rest::process_csv,
        rest::create_and_store_data,
        rest::process_file,
        rest::search,
        rest::delete_collection,
        rest::list_collections,
    ),
    components(
        schemas(
            IngestResponse, IngestSummary,
            SearchResponse, SearchHit,
            CollectionsListResponse, MessageResponse,
            axum_helpers::ErrorResponse
        )
    ),
    tags(
        (name = "ingestion", description = "CSV ingestion into vector collections"),
        (name = "search", description = "Similarity search across collections"),
        (name = "collections", description = "Collection management")
    )
)]
pub struct VectorApiDoc;

/// Create router for the vector API
pub fn router(service: Arc<VectorService>) -> Router {
    Router::new()
        .route("/process_csv", post(rest::process_csv))
        .route("/create_and_store_data", post(rest::create_and_store_data))
        .route("/process_file", post(rest::process_file))
        .route("/search", get(rest::search))
        .route("/delete_collection", delete(rest::delete_collection))
        .route("/collections", get(rest::list_collections))
        .with_state(service)
}
