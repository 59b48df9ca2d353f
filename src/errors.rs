//! # Error Handling Module
//!
//! ## Purpose
//! Centralized error handling for the statute retrieval engine, providing structured
//! error types and conversion utilities for all system components.
//!
//! ## Input/Output Specification
//! - **Input**: Error conditions from various system components
//! - **Output**: Structured error types with context and error chains
//! - **Error Categories**: Query, Embedding, Corpus, Index, Configuration, API
//!
//! ## Key Features
//! - Caller errors (`InvalidQuery`) kept distinct from provider failures (`EncodingFailed`)
//!   and startup failures (`CorpusLoadFailed`, `DimensionMismatch`)
//! - Automatic error conversion and chaining
//! - User-friendly error messages for API responses
//! - Structured logging integration

use thiserror::Error;

/// Result type used throughout the application
pub type Result<T> = std::result::Result<T, SearchError>;

/// Error types for the statute retrieval engine
#[derive(Debug, Error)]
pub enum SearchError {
    /// Caller error: empty or malformed query input. Never retried.
    #[error("Invalid query: {reason}")]
    InvalidQuery { reason: String },

    /// Embedding provider unavailable or rejected the input. Recovered per
    /// request by degrading to empty results; never retried synchronously.
    #[error("Embedding generation failed: {text_preview} - {reason}")]
    EncodingFailed {
        text_preview: String,
        reason: String,
    },

    /// Build artifact missing, corrupt, or internally inconsistent.
    #[error("Corpus load failed from {path}: {details}")]
    CorpusLoadFailed { path: String, details: String },

    /// Embedding dimensionality disagrees between corpus and provider.
    /// Indicates version skew; fatal at startup, never surfaced per request.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// No valid corpus+index pairing is installed yet.
    #[error("Service not ready: {details}")]
    NotReady { details: String },

    /// Statute table could not be read or parsed
    #[error("Statute table error in {path}: {details}")]
    StatuteTable { path: String, details: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation failed for field '{field}': {reason}")]
    ValidationFailed { field: String, reason: String },

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(std::io::Error),

    /// Binary serialization errors
    #[error("Serialization error: {0}")]
    Serialization(bincode::Error),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(toml::de::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// Internal system errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl SearchError {
    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            SearchError::InvalidQuery { .. } => "query",
            SearchError::EncodingFailed { .. } | SearchError::Http(_) => "embedding",
            SearchError::CorpusLoadFailed { .. }
            | SearchError::StatuteTable { .. }
            | SearchError::NotReady { .. } => "corpus",
            SearchError::DimensionMismatch { .. } => "index",
            SearchError::Config { .. } | SearchError::Toml(_) => "configuration",
            SearchError::Io(_) | SearchError::Serialization(_) | SearchError::Json(_) => "storage",
            SearchError::ValidationFailed { .. } | SearchError::Internal { .. } => "generic",
        }
    }

    /// Whether retrieval may recover from the error by degrading to empty
    /// results instead of failing the caller's request
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            SearchError::EncodingFailed { .. } | SearchError::Http(_)
        )
    }
}

// Conversion from common error types
impl From<std::io::Error> for SearchError {
    fn from(err: std::io::Error) -> Self {
        SearchError::Io(err)
    }
}

impl From<bincode::Error> for SearchError {
    fn from(err: bincode::Error) -> Self {
        SearchError::Serialization(err)
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::Json(err)
    }
}

impl From<toml::de::Error> for SearchError {
    fn from(err: toml::de::Error) -> Self {
        SearchError::Toml(err)
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        SearchError::Http(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let err = SearchError::InvalidQuery {
            reason: "empty".to_string(),
        };
        assert_eq!(err.category(), "query");

        let err = SearchError::DimensionMismatch {
            expected: 384,
            actual: 768,
        };
        assert_eq!(err.category(), "index");
    }

    #[test]
    fn test_degradable() {
        let encoding = SearchError::EncodingFailed {
            text_preview: "...".to_string(),
            reason: "service unavailable".to_string(),
        };
        assert!(encoding.is_degradable());

        let invalid = SearchError::InvalidQuery {
            reason: "empty".to_string(),
        };
        assert!(!invalid.is_degradable());
    }
}
