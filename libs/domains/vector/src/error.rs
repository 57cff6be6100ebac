use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, ErrorCode};
use core_config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VectorError {
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    /// The store answered but rejected the request.
    #[error("Vector store error: {0}")]
    Store(String),

    /// The store could not be reached or timed out.
    #[error("Vector store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Input file error: {0}")]
    Input(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type VectorResult<T> = Result<T, VectorError>;

impl From<serde_json::Error> for VectorError {
    fn from(err: serde_json::Error) -> Self {
        VectorError::Internal(format!("JSON error: {}", err))
    }
}

impl From<csv::Error> for VectorError {
    fn from(err: csv::Error) -> Self {
        VectorError::Input(err.to_string())
    }
}

impl From<std::io::Error> for VectorError {
    fn from(err: std::io::Error) -> Self {
        VectorError::Input(err.to_string())
    }
}

impl From<ConfigError> for VectorError {
    fn from(err: ConfigError) -> Self {
        VectorError::Config(err.to_string())
    }
}

/// Convert VectorError to AppError for standardized HTTP error responses
impl From<VectorError> for AppError {
    fn from(err: VectorError) -> Self {
        match err {
            VectorError::CollectionNotFound(name) => {
                AppError::NotFound(format!("Collection '{}' does not exist.", name))
            }
            VectorError::Validation(msg) => AppError::BadRequest(msg),
            VectorError::Store(msg) => AppError::Upstream(ErrorCode::VectorStoreError, msg),
            VectorError::StoreUnavailable(msg) => {
                AppError::Upstream(ErrorCode::VectorStoreUnavailable, msg)
            }
            VectorError::Embedding(msg) => AppError::Upstream(ErrorCode::EmbeddingError, msg),
            VectorError::Input(msg) => AppError::Upstream(ErrorCode::InputFormatError, msg),
            VectorError::Config(msg) => AppError::Upstream(ErrorCode::ConfigError, msg),
            VectorError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for VectorError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
