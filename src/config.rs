//! # Configuration Management Module
//!
//! ## Purpose
//! Centralized configuration management for the statute retrieval engine, supporting
//! multiple sources (files, environment variables, command line arguments) with
//! validation and type-safe access to all system settings.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration files (TOML), environment variables, CLI arguments
//! - **Output**: Validated configuration structs with defaults and overrides
//! - **Validation**: Type checking, range validation, dependency verification
//!
//! ## Configuration Sources (in order of precedence)
//! 1. Command line arguments (highest priority)
//! 2. Environment variables
//! 3. Configuration files
//! 4. Default values (lowest priority)
//!
//! ## Usage
//! ```rust,no_run
//! use statute_semantic_search::config::Config;
//!
//! let config = Config::from_file("config.toml").unwrap();
//! println!("Server port: {}", config.server.port);
//! ```

use crate::errors::{Result, SearchError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure containing all system settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server and API configuration
    pub server: ServerConfig,
    /// Embedding provider configuration
    pub embedding: EmbeddingConfig,
    /// Corpus artifact configuration
    pub corpus: CorpusConfig,
    /// Search behavior
    pub search: SearchEngineConfig,
    /// Offline index builder settings
    pub builder: BuilderConfig,
    /// Logging and monitoring
    pub logging: LoggingConfig,
}

/// Server and API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Request timeout in seconds
    pub request_timeout_seconds: u64,
    /// Enable CORS
    pub enable_cors: bool,
}

/// Embedding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL of the sentence-encoder service
    pub endpoint_url: String,
    /// Model identifier sent with each request
    pub model: String,
    /// Output vector dimension (must match the loaded corpus)
    pub dimension: usize,
    /// Maximum texts per batch request
    pub batch_size: usize,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

/// Corpus artifact configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Path of the persisted corpus+index build artifact
    pub artifact_path: PathBuf,
}

/// Search behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchEngineConfig {
    /// Number of results returned when the caller does not specify k
    pub default_k: usize,
    /// Largest k a caller may request
    pub max_k: usize,
    /// Maximum query length in characters
    pub max_query_length: usize,
}

/// Offline index builder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Path of the raw statute table (CSV: section identifier + description)
    pub statute_table_path: PathBuf,
    /// Number of encode batches in flight at once
    pub max_concurrent_batches: usize,
}

/// Logging and monitoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable structured JSON logging
    pub json_format: bool,
}

impl Config {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::from_file("config.toml")
    }

    /// Load configuration from a specific file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!("Configuration file not found: {:?}, using defaults", path);
            let mut config = Self::default();
            config.apply_env_overrides()?;
            config.validate()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path).map_err(|e| SearchError::Config {
            message: format!("Failed to read config file {:?}: {}", path, e),
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| SearchError::Config {
            message: format!("Failed to parse config file {:?}: {}", path, e),
        })?;

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("STATUTE_SEARCH_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("STATUTE_SEARCH_PORT") {
            self.server.port = port.parse().map_err(|_| SearchError::Config {
                message: "Invalid port number in STATUTE_SEARCH_PORT".to_string(),
            })?;
        }
        if let Ok(url) = std::env::var("STATUTE_SEARCH_EMBEDDING_URL") {
            self.embedding.endpoint_url = url;
        }
        if let Ok(artifact) = std::env::var("STATUTE_SEARCH_ARTIFACT_PATH") {
            self.corpus.artifact_path = PathBuf::from(artifact);
        }

        Ok(())
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(SearchError::ValidationFailed {
                field: "server.port".to_string(),
                reason: "Port cannot be zero".to_string(),
            });
        }

        if self.embedding.dimension == 0 {
            return Err(SearchError::ValidationFailed {
                field: "embedding.dimension".to_string(),
                reason: "Vector dimension must be greater than zero".to_string(),
            });
        }

        if self.embedding.batch_size == 0 {
            return Err(SearchError::ValidationFailed {
                field: "embedding.batch_size".to_string(),
                reason: "Batch size must be greater than zero".to_string(),
            });
        }

        if self.search.default_k == 0 {
            return Err(SearchError::ValidationFailed {
                field: "search.default_k".to_string(),
                reason: "Default k must be greater than zero".to_string(),
            });
        }

        if self.search.default_k > self.search.max_k {
            return Err(SearchError::ValidationFailed {
                field: "search.default_k".to_string(),
                reason: "Default k cannot exceed max_k".to_string(),
            });
        }

        if self.builder.max_concurrent_batches == 0 {
            return Err(SearchError::ValidationFailed {
                field: "builder.max_concurrent_batches".to_string(),
                reason: "Concurrency must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                request_timeout_seconds: 30,
                enable_cors: true,
            },
            embedding: EmbeddingConfig {
                endpoint_url: "http://127.0.0.1:8501".to_string(),
                model: "all-MiniLM-L6-v2".to_string(),
                dimension: 384,
                batch_size: 32,
                timeout_seconds: 30,
            },
            corpus: CorpusConfig {
                artifact_path: PathBuf::from("./data/statute_corpus.bin.gz"),
            },
            search: SearchEngineConfig {
                default_k: 5,
                max_k: 50,
                max_query_length: 10_000,
            },
            builder: BuilderConfig {
                statute_table_path: PathBuf::from("./data/statute_sections.csv"),
                max_concurrent_batches: num_cpus::get(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json_format: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.search.default_k, 5);
        assert_eq!(config.embedding.dimension, 384);
    }

    #[test]
    fn test_rejects_zero_dimension() {
        let mut config = Config::default();
        config.embedding.dimension = 0;
        assert!(matches!(
            config.validate(),
            Err(SearchError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn test_rejects_default_k_above_max() {
        let mut config = Config::default();
        config.search.default_k = 100;
        assert!(config.validate().is_err());
    }
}
