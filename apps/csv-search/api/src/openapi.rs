use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "CSV Search API",
        version = "0.1.0",
        description = "Embeds CSV rows into Milvus collections and searches them by meaning"
    )
)]
struct BaseDoc;

/// Service info merged with the vector domain's paths
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        BaseDoc::openapi().merge_from(domain_vector::VectorApiDoc::openapi())
    }
}
