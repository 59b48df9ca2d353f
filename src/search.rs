//! # Retrieval Engine Module
//!
//! ## Purpose
//! Composes the normalizer, embedding provider, and vector index into a single
//! `search(raw_text, k)` operation returning ranked statute sections. Owns
//! tie-breaking, result shaping, and failure policy.
//!
//! ## Input/Output Specification
//! - **Input**: Raw incident narrative, optional result count k
//! - **Output**: Ranked results carrying section id, description, distance, 1-based rank
//! - **Failure policy**: Empty input is a caller error; embedding failures degrade
//!   to an empty result list; searching before a corpus is installed is `NotReady`
//!
//! ## Key Features
//! - Read-only search path: unbounded concurrent calls, no mutual exclusion
//! - Active corpus+index pairing behind one swappable reference; a request
//!   observes either the whole old pairing or the whole new pairing
//! - No lock held across a suspension point

use crate::config::Config;
use crate::corpus::{CorpusArtifact, StatuteCorpus};
use crate::embedding::EmbeddingProvider;
use crate::errors::{Result, SearchError};
use crate::normalizer::Normalizer;
use crate::utils::TextUtils;
use crate::vector::VectorIndex;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Main retrieval engine
pub struct SearchEngine {
    config: Arc<Config>,
    normalizer: Normalizer,
    provider: Arc<dyn EmbeddingProvider>,
    active: RwLock<Option<Arc<ActivePairing>>>,
}

/// One atomic corpus+index generation. Replaced wholesale on rebuild, never
/// mutated; the row order of `index` corresponds one-to-one with `corpus`.
pub struct ActivePairing {
    /// Statute corpus entries in artifact row order
    pub corpus: StatuteCorpus,
    /// Nearest-neighbor index over the corpus embeddings
    pub index: VectorIndex,
    /// Embedding model the pairing was built with
    pub model: String,
    /// Build timestamp of the underlying artifact
    pub built_at: DateTime<Utc>,
}

/// One ranked statute section returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    /// 1-based position in the result sequence
    pub rank: usize,
    /// Statute section identifier
    pub section_id: String,
    /// Statute description text
    pub description: String,
    /// Squared Euclidean distance between query and section embeddings.
    /// Raw, unnormalized; callers display it as-is.
    pub distance: f32,
}

/// Engine statistics for monitoring endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStats {
    pub ready: bool,
    pub corpus_size: usize,
    pub dimension: usize,
    pub model: Option<String>,
    pub built_at: Option<DateTime<Utc>>,
}

impl SearchEngine {
    /// Create an engine with no corpus installed. `search` answers `NotReady`
    /// until a pairing is loaded.
    pub fn new(config: Arc<Config>, provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            config,
            normalizer: Normalizer::default(),
            provider,
            active: RwLock::new(None),
        }
    }

    /// Whether a corpus+index pairing is installed
    pub fn is_ready(&self) -> bool {
        self.active.read().is_some()
    }

    /// Load a build artifact from disk, validate it against the configured
    /// provider, and atomically install the resulting pairing
    pub fn load_artifact<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let artifact = CorpusArtifact::load(path)?;

        if artifact.dimension != self.provider.dimension() {
            return Err(SearchError::DimensionMismatch {
                expected: self.provider.dimension(),
                actual: artifact.dimension,
            });
        }

        let corpus = StatuteCorpus::from_artifact(&artifact);
        let index = VectorIndex::build(artifact.dimension, &artifact.embeddings)?;

        self.install(ActivePairing {
            corpus,
            index,
            model: artifact.model,
            built_at: artifact.built_at,
        })
    }

    /// Atomically swap in a new pairing. In-flight searches keep the pairing
    /// they already resolved; subsequent searches observe the new one.
    pub fn install(&self, pairing: ActivePairing) -> Result<()> {
        if pairing.index.size() != pairing.corpus.len() {
            return Err(SearchError::Internal {
                message: format!(
                    "index has {} rows but corpus has {} entries",
                    pairing.index.size(),
                    pairing.corpus.len()
                ),
            });
        }
        if pairing.index.dimension() != pairing.corpus.dimension() {
            return Err(SearchError::DimensionMismatch {
                expected: pairing.corpus.dimension(),
                actual: pairing.index.dimension(),
            });
        }

        tracing::info!(
            "Installing corpus+index pairing: {} entries, dimension {}, model '{}'",
            pairing.corpus.len(),
            pairing.index.dimension(),
            pairing.model
        );

        *self.active.write() = Some(Arc::new(pairing));
        Ok(())
    }

    /// Search for the k statute sections nearest to the narrative. `k` of
    /// `None` uses the configured default.
    pub async fn search(&self, raw_text: &str, k: Option<usize>) -> Result<Vec<RankedResult>> {
        if raw_text.trim().is_empty() {
            return Err(SearchError::InvalidQuery {
                reason: "query text is empty".to_string(),
            });
        }
        if raw_text.len() > self.config.search.max_query_length {
            return Err(SearchError::InvalidQuery {
                reason: format!(
                    "query exceeds maximum length of {} characters",
                    self.config.search.max_query_length
                ),
            });
        }

        let k = k.unwrap_or(self.config.search.default_k);
        if k == 0 {
            return Err(SearchError::InvalidQuery {
                reason: "k must be greater than zero".to_string(),
            });
        }
        if k > self.config.search.max_k {
            return Err(SearchError::InvalidQuery {
                reason: format!("k exceeds maximum of {}", self.config.search.max_k),
            });
        }

        // Resolve the active pairing up front; the guard is released before
        // any await so the swap lock is never held across a suspension point.
        let pairing = self.active.read().as_ref().cloned();
        let pairing = pairing.ok_or_else(|| SearchError::NotReady {
            details: "no corpus+index pairing installed".to_string(),
        })?;

        let normalized = self.normalizer.normalize(raw_text);
        let composite = normalized.composite_text();
        tracing::debug!(
            "Normalized query '{}' (keywords: {:?})",
            TextUtils::truncate(&composite, 120),
            normalized.matched_keywords
        );

        let query_vector = match self.provider.encode(&composite).await {
            Ok(vector) => vector,
            Err(err) if err.is_degradable() => {
                tracing::warn!(
                    "Embedding failed for query '{}', degrading to empty results: {}",
                    TextUtils::truncate(raw_text, 80),
                    err
                );
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };

        let hits = pairing.index.search(&query_vector, k)?;

        let mut results = Vec::with_capacity(hits.len());
        for (position, (row, distance)) in hits.into_iter().enumerate() {
            let entry = pairing.corpus.entry(row).ok_or_else(|| SearchError::Internal {
                message: format!("index returned row {} outside corpus", row),
            })?;
            results.push(RankedResult {
                rank: position + 1,
                section_id: entry.section_id.clone(),
                description: entry.description.clone(),
                distance,
            });
        }

        Ok(results)
    }

    /// Engine statistics for monitoring
    pub fn stats(&self) -> EngineStats {
        let pairing = self.active.read().as_ref().cloned();
        match pairing {
            Some(pairing) => EngineStats {
                ready: true,
                corpus_size: pairing.corpus.len(),
                dimension: pairing.index.dimension(),
                model: Some(pairing.model.clone()),
                built_at: Some(pairing.built_at),
            },
            None => EngineStats {
                ready: false,
                corpus_size: 0,
                dimension: self.provider.dimension(),
                model: None,
                built_at: None,
            },
        }
    }
}
