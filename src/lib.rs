//! # Semantic Statute Retrieval Engine
//!
//! ## Overview
//! This library maps free-form incident narratives onto ranked lists of
//! candidate legal statute sections. Noisy, administratively-formatted
//! narrative text is normalized into a search-optimized query, projected into
//! a vector space shared with a precomputed corpus of statute descriptions,
//! and matched against the corpus by exact nearest-neighbor search.
//!
//! ## Architecture
//! The system is composed of several key modules:
//! - `keywords`: Fixed catalog of crime-category terms
//! - `normalizer`: Narrative cleaning and keyword-weighted query construction
//! - `embedding`: Boundary to the external sentence-encoder capability
//! - `corpus`: Statute corpus records and the persisted build artifact
//! - `vector`: Exact k-nearest-neighbor index over corpus embeddings
//! - `search`: Retrieval engine composing the above into ranked results
//! - `builder`: Offline batch process emitting the corpus+index artifact
//! - `api`: REST API endpoints
//! - `config`: Configuration management and settings
//! - `errors`: Centralized error handling and types
//!
//! ## Input/Output Specification
//! - **Input**: Raw incident narratives (text), statute tables (CSV, offline)
//! - **Output**: Ranked statute sections with section id, description, distance
//! - **Performance**: Interactive query latency, deterministic results
//!
//! ## Usage
//! ```rust,no_run
//! use statute_semantic_search::{Config, HttpEmbeddingProvider, SearchEngine};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(Config::from_file("config.toml")?);
//!     let provider = Arc::new(HttpEmbeddingProvider::new(&config.embedding)?);
//!     let engine = SearchEngine::new(config.clone(), provider);
//!     engine.load_artifact(&config.corpus.artifact_path)?;
//!     let results = engine.search("My bicycle was stolen from the park", None).await?;
//!     println!("Found {} candidate sections", results.len());
//!     Ok(())
//! }
//! ```

// Core modules
pub mod builder;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod errors;
pub mod keywords;
pub mod normalizer;
pub mod search;
pub mod vector;

// Service surface
pub mod api;

// Utilities
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use embedding::{EmbeddingProvider, HttpEmbeddingProvider};
pub use errors::{Result, SearchError};
pub use search::{RankedResult, SearchEngine};

use std::sync::Arc;

/// Application state shared across components
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Config>,
    pub engine: Arc<search::SearchEngine>,
}
