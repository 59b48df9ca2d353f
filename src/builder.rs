//! # Offline Index Builder Module
//!
//! ## Purpose
//! Batch process that reads the raw statute table, encodes every description
//! through the embedding provider, and emits the persisted corpus+index build
//! artifact consumed at service startup.
//!
//! ## Input/Output Specification
//! - **Input**: CSV statute table (section identifier + description per row)
//! - **Output**: `CorpusArtifact` with row-for-row table/matrix correspondence
//! - **Idempotence**: Same table + same provider version yields row-for-row
//!   identical output
//!
//! ## Key Features
//! - Missing descriptions replaced with empty strings
//! - Concurrent batch encoding with original row order preserved
//! - Atomic artifact emission (both halves reference the same row ordering)

use crate::config::Config;
use crate::corpus::{CorpusArtifact, StatuteSection};
use crate::embedding::EmbeddingProvider;
use crate::errors::{Result, SearchError};
use crate::utils::Timer;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::path::Path;
use std::sync::Arc;

/// Offline builder producing corpus artifacts
pub struct IndexBuilder {
    provider: Arc<dyn EmbeddingProvider>,
    model: String,
    batch_size: usize,
    max_concurrent_batches: usize,
}

impl IndexBuilder {
    /// Create a builder from configuration and an embedding provider
    pub fn new(config: &Config, provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            model: config.embedding.model.clone(),
            batch_size: config.embedding.batch_size,
            max_concurrent_batches: config.builder.max_concurrent_batches,
        }
    }

    /// Read the statute table and build the artifact
    pub async fn build_from_table<P: AsRef<Path>>(&self, table_path: P) -> Result<CorpusArtifact> {
        let sections = read_statute_table(&table_path)?;
        tracing::info!(
            "Read {} statute sections from {:?}",
            sections.len(),
            table_path.as_ref()
        );
        self.build(sections).await
    }

    /// Encode all section descriptions and assemble the artifact. Batches run
    /// concurrently; `buffered` keeps completion in submission order, so the
    /// embedding matrix preserves table row order.
    pub async fn build(&self, sections: Vec<StatuteSection>) -> Result<CorpusArtifact> {
        let timer = Timer::new("index_build");
        let descriptions: Vec<String> = sections.iter().map(|s| s.description.clone()).collect();

        let batches: Vec<Vec<String>> = descriptions
            .chunks(self.batch_size.max(1))
            .map(|chunk| chunk.to_vec())
            .collect();
        let batch_count = batches.len();

        let provider = Arc::clone(&self.provider);
        let encoded: Vec<Vec<Vec<f32>>> = stream::iter(batches.into_iter().map(|batch| {
            let provider = Arc::clone(&provider);
            async move { provider.encode_batch(&batch).await }
        }))
        .buffered(self.max_concurrent_batches.max(1))
        .try_collect()
        .await?;

        let embeddings: Vec<Vec<f32>> = encoded.into_iter().flatten().collect();

        tracing::info!(
            "Encoded {} descriptions in {} batches ({}ms)",
            embeddings.len(),
            batch_count,
            timer.elapsed_ms()
        );

        CorpusArtifact::new(
            self.model.clone(),
            self.provider.dimension(),
            sections,
            embeddings,
        )
    }
}

/// Read the raw statute table: one section identifier and one description per
/// row. Rows with a missing description yield an empty string. Header lookup
/// is case-insensitive; the table is decoded lossily so legacy encodings do
/// not abort the build.
pub fn read_statute_table<P: AsRef<Path>>(path: P) -> Result<Vec<StatuteSection>> {
    let path = path.as_ref();
    let origin = path.to_string_lossy().to_string();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| SearchError::StatuteTable {
            path: origin.clone(),
            details: format!("cannot open table: {}", e),
        })?;

    let headers = reader
        .byte_headers()
        .map_err(|e| SearchError::StatuteTable {
            path: origin.clone(),
            details: format!("cannot read header row: {}", e),
        })?
        .clone();

    let column_index = |name: &str| {
        headers.iter().position(|h| {
            String::from_utf8_lossy(h)
                .trim()
                .eq_ignore_ascii_case(name)
        })
    };

    let section_idx = column_index("section").ok_or_else(|| SearchError::StatuteTable {
        path: origin.clone(),
        details: "missing 'Section' column".to_string(),
    })?;
    let description_idx = column_index("description").ok_or_else(|| SearchError::StatuteTable {
        path: origin.clone(),
        details: "missing 'Description' column".to_string(),
    })?;

    let mut sections = Vec::new();
    for record in reader.byte_records() {
        let record = record.map_err(|e| SearchError::StatuteTable {
            path: origin.clone(),
            details: format!("malformed row: {}", e),
        })?;

        let section_id = record
            .get(section_idx)
            .map(|b| String::from_utf8_lossy(b).trim().to_string())
            .unwrap_or_default();
        let description = record
            .get(description_idx)
            .map(|b| String::from_utf8_lossy(b).trim().to_string())
            .unwrap_or_default();

        sections.push(StatuteSection {
            section_id,
            description,
        });
    }

    Ok(sections)
}
