use axum::Router;

pub mod health;

/// Creates the API routes. Documentation UIs and middleware are added by
/// the `create_router` helper.
pub fn routes(state: &crate::state::AppState) -> Router {
    domain_vector::router(state.service.clone())
}

/// Creates a router with the /ready endpoint that checks the vector store.
///
/// This router has state applied and can be merged with the stateless app
/// router from `create_router`.
pub fn ready_router(state: crate::state::AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::state::AppState;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use domain_vector::{
        Embedder, InMemoryStore, MilvusConfig, MilvusStore, OpenAIProvider, Unthrottled,
        VectorService, VectorStore,
    };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::io::Write;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn config() -> Config {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "question_id,question").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        temp_env::with_vars(
            [
                ("MILVUS_HOST", Some("127.0.0.1")),
                ("MILVUS_PORT", Some("19530")),
                ("OPENAI_API_KEY", Some("sk-test")),
                ("OPENAI_ENGINE", Some("text-embedding-3-small")),
                ("CSV_FILE_PATH", Some(path.as_str())),
                ("MAX_RECORDS", Some("0")),
                ("METRIC_TYPE", None),
            ],
            || Config::from_env().unwrap(),
        )
    }

    fn state(store: Arc<dyn VectorStore>) -> AppState {
        let config = config();
        let embedder = Embedder::new(
            Arc::new(OpenAIProvider::new(config.openai.clone()).unwrap()),
            Arc::new(Unthrottled),
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
        AppState {
            config,
            service: Arc::new(service),
        }
    }

    async fn ready(state: AppState) -> (StatusCode, Value) {
        let response = ready_router(state)
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_ready_when_store_reachable() {
        let (status, body) = ready(state(Arc::new(InMemoryStore::new()))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["vector_store"], "connected");
    }

    #[tokio::test]
    async fn test_not_ready_when_store_unreachable() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let store = MilvusStore::new(MilvusConfig::new("127.0.0.1", port).with_timeout(2)).unwrap();

        let (status, body) = ready(state(Arc::new(store))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["vector_store"], "disconnected");
    }
}
