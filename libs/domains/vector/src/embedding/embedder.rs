use observability::PipelineMetrics;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::EmbeddingProvider;
use crate::models::EmbeddingModel;
use crate::rate_limit::RequestThrottle;

/// Turns text into a vector, or nothing.
///
/// Every call waits on the shared throttle, then asks the provider under a
/// timeout. Transport errors, API errors, timeouts and vectors of the wrong
/// length are logged and reported as `None`.
#[derive(Clone)]
pub struct Embedder {
    provider: Arc<dyn EmbeddingProvider>,
    throttle: Arc<dyn RequestThrottle>,
    model: EmbeddingModel,
    timeout: Duration,
}

impl Embedder {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        throttle: Arc<dyn RequestThrottle>,
        model: EmbeddingModel,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            throttle,
            model,
            timeout,
        }
    }

    pub fn model(&self) -> &EmbeddingModel {
        &self.model
    }

    /// Length of every vector this embedder returns.
    pub fn dimension(&self) -> u32 {
        self.model.dimension()
    }

    pub async fn embed(&self, text: &str) -> Option<Vec<f32>> {
        if text.trim().is_empty() {
            debug!("Skipping embedding of empty text");
            return None;
        }

        self.throttle.acquire().await;

        let result = tokio::time::timeout(self.timeout, self.provider.embed(&self.model, text)).await;

        match result {
            Ok(Ok(embedding)) if embedding.values.len() == self.dimension() as usize => {
                PipelineMetrics::record_embedding_request("ok");
                Some(embedding.values)
            }
            Ok(Ok(embedding)) => {
                PipelineMetrics::record_embedding_request("dimension_mismatch");
                warn!(
                    model = self.model.model_name(),
                    expected = self.dimension(),
                    actual = embedding.values.len(),
                    "Embedding has unexpected dimension"
                );
                None
            }
            Ok(Err(e)) => {
                PipelineMetrics::record_embedding_request("error");
                warn!(
                    model = self.model.model_name(),
                    error = %e,
                    "Error embedding text: {}",
                    preview(text)
                );
                None
            }
            Err(_) => {
                PipelineMetrics::record_embedding_request("timeout");
                warn!(
                    model = self.model.model_name(),
                    timeout = ?self.timeout,
                    "Embedding request timed out"
                );
                None
            }
        }
    }
}

fn preview(text: &str) -> String {
    const MAX: usize = 80;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(MAX).collect::<String>())
    }
}
