use axum::{middleware, routing::get};
use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_vector::{
    Embedder, GovernorThrottle, MilvusStore, OpenAIProvider, VectorService, VectorStore,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing with ErrorLayer for span trace capture
    init_tracing(&config.environment);
    observability::init_metrics();

    info!(
        milvus = %config.milvus.base_url(),
        model = config.embedding.model.model_name(),
        dimension = config.embedding.model.dimension(),
        csv = %config.ingest.csv_path.display(),
        "Configuration loaded"
    );

    let store: Arc<dyn VectorStore> = Arc::new(
        MilvusStore::new(config.milvus.clone())
            .map_err(|e| eyre::eyre!("Milvus client setup failed: {}", e))?,
    );

    let provider = OpenAIProvider::new(config.openai.clone())
        .map_err(|e| eyre::eyre!("OpenAI client setup failed: {}", e))?;
    let embedder = Embedder::new(
        Arc::new(provider),
        Arc::new(GovernorThrottle::per_minute(
            config.embedding.requests_per_minute,
        )),
        config.embedding.model.clone(),
        config.embedding.timeout,
    );

    let service = VectorService::new(
        store,
        embedder,
        config.index,
        config.ingest.clone(),
        config.search.clone(),
    );

    let state = AppState {
        config,
        service: Arc::new(service),
    };

    let api_routes = api::routes(&state);

    // create_router adds docs/middleware to our composed routes
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes, &state.config.server)?;

    // - /health: liveness check with app name/version
    // - /ready: readiness check against the vector store
    // - /metrics: Prometheus exposition
    let app = router
        .merge(health_router(state.config.app))
        .merge(api::ready_router(state.clone()))
        .route("/metrics", get(observability::metrics_handler))
        .layer(middleware::from_fn(observability::metrics_middleware));

    info!("Starting CSV search API with graceful shutdown (30s timeout)");

    create_production_app(
        app,
        &state.config.server,
        Duration::from_secs(30),
        async move {
            info!("Shutting down: no connections to drain");
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("CSV search API shutdown complete");
    Ok(())
}
