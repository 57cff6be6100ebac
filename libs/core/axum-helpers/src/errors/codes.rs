//! Type-safe error codes for API responses.
//!
//! Each error code includes:
//! - String representation for client consumption (e.g., "VALIDATION_ERROR")
//! - Integer code for logging and monitoring (e.g., 1001)
//! - Default human-readable message
//!
//! # Example
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::ValidationError;
//! assert_eq!(code.as_str(), "VALIDATION_ERROR");
//! assert_eq!(code.code(), 1001);
//! assert_eq!(code.default_message(), "Request validation failed");
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standardized error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// Request validation failed
    ValidationError,

    /// Query string could not be parsed
    InvalidQuery,

    /// Requested resource was not found
    NotFound,

    /// Request conflicts with current resource state
    Conflict,

    /// JSON extraction from request body failed
    JsonExtraction,

    /// An unexpected internal server error occurred
    InternalError,

    /// Service is temporarily unavailable
    ServiceUnavailable,

    // Vector store errors (2000-2999)
    /// The vector store rejected the request
    VectorStoreError,

    /// The vector store could not be reached
    VectorStoreUnavailable,

    // Embedding errors (3000-3999)
    /// The embedding service failed
    EmbeddingError,

    // I/O errors (4000s)
    /// File system I/O error
    IoError,

    /// Input file could not be parsed
    InputFormatError,

    // JSON parsing errors (5000s)
    /// JSON serialization/deserialization error
    SerdeJsonError,

    // Configuration errors (6000s)
    /// Server is misconfigured
    ConfigError,
}

impl ErrorCode {
    /// SCREAMING_SNAKE_CASE identifier for clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidQuery => "INVALID_QUERY",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::JsonExtraction => "JSON_EXTRACTION",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::VectorStoreError => "VECTOR_STORE_ERROR",
            Self::VectorStoreUnavailable => "VECTOR_STORE_UNAVAILABLE",
            Self::EmbeddingError => "EMBEDDING_ERROR",
            Self::IoError => "IO_ERROR",
            Self::InputFormatError => "INPUT_FORMAT_ERROR",
            Self::SerdeJsonError => "SERDE_JSON_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }

    /// Integer code for structured logs and metrics.
    ///
    /// - 1000-1999: Client errors
    /// - 2000-2999: Vector store errors
    /// - 3000-3999: Embedding errors
    /// - 4000-4999: I/O errors
    /// - 5000-5999: Serialization errors
    /// - 6000-6999: Configuration errors
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::InvalidQuery => 1002,
            Self::JsonExtraction => 1003,
            Self::NotFound => 1004,
            Self::InternalError => 1005,
            Self::Conflict => 1008,
            Self::ServiceUnavailable => 1011,

            Self::VectorStoreError => 2001,
            Self::VectorStoreUnavailable => 2002,

            Self::EmbeddingError => 3001,

            Self::IoError => 4001,
            Self::InputFormatError => 4002,

            Self::SerdeJsonError => 5001,

            Self::ConfigError => 6001,
        }
    }

    /// Default user-facing message.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::InvalidQuery => "Invalid query parameters",
            Self::NotFound => "Resource not found",
            Self::Conflict => "Resource already exists",
            Self::JsonExtraction => "Failed to parse request body",
            Self::InternalError => "An internal server error occurred",
            Self::ServiceUnavailable => "Service is temporarily unavailable",
            Self::VectorStoreError => "Vector store error occurred",
            Self::VectorStoreUnavailable => "Vector store is unavailable",
            Self::EmbeddingError => "Embedding service error",
            Self::IoError => "I/O error occurred",
            Self::InputFormatError => "Input file could not be parsed",
            Self::SerdeJsonError => "JSON serialization error",
            Self::ConfigError => "Server configuration error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_string_representation() {
        assert_eq!(ErrorCode::ValidationError.as_str(), "VALIDATION_ERROR");
        assert_eq!(ErrorCode::NotFound.as_str(), "NOT_FOUND");
        assert_eq!(ErrorCode::VectorStoreError.as_str(), "VECTOR_STORE_ERROR");
    }

    #[test]
    fn test_error_code_integer_codes() {
        assert_eq!(ErrorCode::ValidationError.code(), 1001);
        assert_eq!(ErrorCode::VectorStoreError.code(), 2001);
        assert_eq!(ErrorCode::EmbeddingError.code(), 3001);
    }

    #[test]
    fn test_error_code_serialization() {
        let json = serde_json::to_string(&ErrorCode::VectorStoreUnavailable).unwrap();
        assert_eq!(json, "\"VECTOR_STORE_UNAVAILABLE\"");

        let code: ErrorCode = serde_json::from_str("\"NOT_FOUND\"").unwrap();
        assert_eq!(code, ErrorCode::NotFound);
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::InputFormatError.to_string(), "INPUT_FORMAT_ERROR");
    }
}
