//! # Embedding Provider Module
//!
//! ## Purpose
//! Boundary to the external sentence-encoder capability. The engine consumes
//! embeddings through the narrow [`EmbeddingProvider`] trait; the concrete
//! model (training, architecture, hosting) is outside this crate.
//!
//! ## Input/Output Specification
//! - **Input**: Query or corpus text (single or batched)
//! - **Output**: Fixed-dimension dense `f32` vectors, deterministic per provider version
//! - **Failure**: `EncodingFailed`, surfaced per request and never retried silently
//!
//! ## Key Features
//! - Single and order-preserving batch encode
//! - HTTP adapter for sentence-encoder services with dimension validation
//! - Request timeouts from configuration

use crate::config::EmbeddingConfig;
use crate::errors::{Result, SearchError};
use crate::utils::TextUtils;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// External embedding capability consumed by the retrieval engine
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Output vector dimension, fixed per provider instance
    fn dimension(&self) -> usize;

    /// Encode a batch of texts into one vector per text, preserving input order
    async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Encode a single text
    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.encode_batch(&[text.to_string()]).await?;
        vectors.pop().ok_or_else(|| SearchError::EncodingFailed {
            text_preview: TextUtils::truncate(text, 80),
            reason: "provider returned no vector".to_string(),
        })
    }
}

/// Embedding client for HTTP sentence-encoder services
pub struct HttpEmbeddingProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    dimension: usize,
    batch_size: usize,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl HttpEmbeddingProvider {
    /// Build a provider from the embedding configuration
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| SearchError::Config {
                message: format!("Failed to build embedding HTTP client: {}", e),
            })?;

        let endpoint = format!("{}/embeddings", config.endpoint_url.trim_end_matches('/'));

        Ok(Self {
            client,
            endpoint,
            model: config.model.clone(),
            dimension: config.dimension,
            batch_size: config.batch_size,
        })
    }

    fn encoding_error(texts: &[String], reason: impl Into<String>) -> SearchError {
        let preview = texts.first().map(String::as_str).unwrap_or_default();
        SearchError::EncodingFailed {
            text_preview: TextUtils::truncate(preview, 80),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if texts.len() > self.batch_size {
            return Err(Self::encoding_error(
                texts,
                format!(
                    "batch of {} exceeds configured max {}",
                    texts.len(),
                    self.batch_size
                ),
            ));
        }

        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| Self::encoding_error(texts, format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::encoding_error(
                texts,
                format!("provider returned status {}", status),
            ));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Self::encoding_error(texts, format!("malformed response: {}", e)))?;

        if parsed.data.len() != texts.len() {
            return Err(Self::encoding_error(
                texts,
                format!(
                    "expected {} vectors, provider returned {}",
                    texts.len(),
                    parsed.data.len()
                ),
            ));
        }

        let mut vectors = Vec::with_capacity(parsed.data.len());
        for item in parsed.data {
            if item.embedding.len() != self.dimension {
                return Err(Self::encoding_error(
                    texts,
                    format!(
                        "provider returned {}-dimensional vector, expected {}",
                        item.embedding.len(),
                        self.dimension
                    ),
                ));
            }
            vectors.push(item.embedding);
        }

        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(url: &str, dimension: usize) -> EmbeddingConfig {
        EmbeddingConfig {
            endpoint_url: url.to_string(),
            model: "all-MiniLM-L6-v2".to_string(),
            dimension,
            batch_size: 4,
            timeout_seconds: 5,
        }
    }

    #[tokio::test]
    async fn test_encode_batch_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    { "embedding": [1.0, 0.0, 0.0] },
                    { "embedding": [0.0, 1.0, 0.0] },
                ]
            })))
            .mount(&server)
            .await;

        let provider = HttpEmbeddingProvider::new(&config(&server.uri(), 3)).unwrap();
        let vectors = provider
            .encode_batch(&["first".to_string(), "second".to_string()])
            .await
            .unwrap();

        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0], vec![1.0, 0.0, 0.0]);
        assert_eq!(vectors[1], vec![0.0, 1.0, 0.0]);
    }

    #[tokio::test]
    async fn test_single_encode_uses_batch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [ { "embedding": [0.5, 0.5] } ]
            })))
            .mount(&server)
            .await;

        let provider = HttpEmbeddingProvider::new(&config(&server.uri(), 2)).unwrap();
        let vector = provider.encode("theft of property").await.unwrap();
        assert_eq!(vector, vec![0.5, 0.5]);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_encoding_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [ { "embedding": [1.0, 2.0, 3.0] } ]
            })))
            .mount(&server)
            .await;

        let provider = HttpEmbeddingProvider::new(&config(&server.uri(), 2)).unwrap();
        let err = provider.encode("text").await.unwrap_err();
        assert!(matches!(err, SearchError::EncodingFailed { .. }));
    }

    #[tokio::test]
    async fn test_server_error_is_encoding_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let provider = HttpEmbeddingProvider::new(&config(&server.uri(), 2)).unwrap();
        let err = provider.encode("text").await.unwrap_err();
        assert!(matches!(err, SearchError::EncodingFailed { .. }));
    }

    #[tokio::test]
    async fn test_oversized_batch_rejected() {
        let provider = HttpEmbeddingProvider::new(&config("http://127.0.0.1:1", 2)).unwrap();
        let texts: Vec<String> = (0..5).map(|i| format!("text {}", i)).collect();
        let err = provider.encode_batch(&texts).await.unwrap_err();
        assert!(matches!(err, SearchError::EncodingFailed { .. }));
    }

    #[tokio::test]
    async fn test_empty_batch_is_empty() {
        let provider = HttpEmbeddingProvider::new(&config("http://127.0.0.1:1", 2)).unwrap();
        let vectors = provider.encode_batch(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }
}
