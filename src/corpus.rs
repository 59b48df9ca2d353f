//! # Statute Corpus Module
//!
//! ## Purpose
//! Immutable, versioned collection of statute section records (identifier,
//! description, precomputed embedding) together with the persisted build
//! artifact format they are loaded from.
//!
//! ## Input/Output Specification
//! - **Input**: Build artifact files produced by the offline index builder
//! - **Output**: Validated, read-only corpus entries in artifact row order
//! - **Persistence**: gzip-compressed bincode, written atomically (temp file + rename)
//!
//! ## Key Features
//! - Row-count and dimensionality invariants enforced at load time
//! - Format versioning with fail-fast rejection of unknown versions
//! - Whole-corpus replacement only; entries are never mutated in place

use crate::errors::{Result, SearchError};
use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Artifact format version understood by this build
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// One row of the raw statute table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatuteSection {
    /// Section identifier, e.g. "303(2)". Not required to be unique.
    pub section_id: String,
    /// Statute description text; empty when the source row had none
    pub description: String,
}

/// One searchable corpus record
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusEntry {
    /// Section identifier
    pub section_id: String,
    /// Statute description text
    pub description: String,
    /// Precomputed embedding of the description
    pub embedding: Vec<f32>,
}

/// Persisted pairing of the row-ordered statute table and its row-ordered
/// embedding matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusArtifact {
    /// Artifact format version
    pub format_version: u32,
    /// Embedding model identifier the matrix was produced with
    pub model: String,
    /// Embedding dimension of every matrix row
    pub dimension: usize,
    /// Build timestamp
    pub built_at: DateTime<Utc>,
    /// Statute table, row-ordered
    pub sections: Vec<StatuteSection>,
    /// Embedding matrix, row order corresponding one-to-one with `sections`
    pub embeddings: Vec<Vec<f32>>,
}

impl CorpusArtifact {
    /// Assemble a validated artifact from build output
    pub fn new(
        model: impl Into<String>,
        dimension: usize,
        sections: Vec<StatuteSection>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Self> {
        let artifact = Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            model: model.into(),
            dimension,
            built_at: Utc::now(),
            sections,
            embeddings,
        };
        artifact.validate("<in-memory>")?;
        Ok(artifact)
    }

    /// Number of corpus rows
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether the artifact holds no rows
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Check internal consistency: known format version, table and matrix row
    /// counts agree, every matrix row has the declared dimension
    pub fn validate(&self, origin: &str) -> Result<()> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(SearchError::CorpusLoadFailed {
                path: origin.to_string(),
                details: format!(
                    "unsupported artifact format version {} (expected {})",
                    self.format_version, ARTIFACT_FORMAT_VERSION
                ),
            });
        }

        if self.sections.len() != self.embeddings.len() {
            return Err(SearchError::CorpusLoadFailed {
                path: origin.to_string(),
                details: format!(
                    "statute table has {} rows but embedding matrix has {}",
                    self.sections.len(),
                    self.embeddings.len()
                ),
            });
        }

        for (row, embedding) in self.embeddings.iter().enumerate() {
            if embedding.len() != self.dimension {
                return Err(SearchError::CorpusLoadFailed {
                    path: origin.to_string(),
                    details: format!(
                        "embedding row {} has dimension {} (artifact declares {})",
                        row,
                        embedding.len(),
                        self.dimension
                    ),
                });
            }
        }

        Ok(())
    }

    /// Write the artifact atomically: serialize to a sibling temp file, then
    /// rename over the target path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = path.with_extension("tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
            bincode::serialize_into(&mut encoder, self)?;
            let mut writer = encoder.finish()?;
            writer.flush()?;
        }
        std::fs::rename(&tmp_path, path)?;

        tracing::info!(
            "Saved corpus artifact: {} rows, dimension {}, model '{}' -> {:?}",
            self.len(),
            self.dimension,
            self.model,
            path
        );
        Ok(())
    }

    /// Load and validate an artifact from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let origin = path.to_string_lossy().to_string();

        let file = File::open(path).map_err(|e| SearchError::CorpusLoadFailed {
            path: origin.clone(),
            details: format!("cannot open artifact: {}", e),
        })?;

        let decoder = GzDecoder::new(BufReader::new(file));
        let artifact: CorpusArtifact =
            bincode::deserialize_from(decoder).map_err(|e| SearchError::CorpusLoadFailed {
                path: origin.clone(),
                details: format!("cannot decode artifact: {}", e),
            })?;

        artifact.validate(&origin)?;

        tracing::info!(
            "Loaded corpus artifact: {} rows, dimension {}, model '{}', built {}",
            artifact.len(),
            artifact.dimension,
            artifact.model,
            artifact.built_at
        );
        Ok(artifact)
    }
}

/// Read-only statute corpus held for the life of an active pairing
#[derive(Debug)]
pub struct StatuteCorpus {
    entries: Vec<CorpusEntry>,
    dimension: usize,
}

impl StatuteCorpus {
    /// Materialize corpus entries from a validated artifact, preserving row order
    pub fn from_artifact(artifact: &CorpusArtifact) -> Self {
        let entries = artifact
            .sections
            .iter()
            .zip(artifact.embeddings.iter())
            .map(|(section, embedding)| CorpusEntry {
                section_id: section.section_id.clone(),
                description: section.description.clone(),
                embedding: embedding.clone(),
            })
            .collect();

        Self {
            entries,
            dimension: artifact.dimension,
        }
    }

    /// Number of corpus entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the corpus is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding dimension shared by all entries
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Entry at the given row, if in range
    pub fn entry(&self, row: usize) -> Option<&CorpusEntry> {
        self.entries.get(row)
    }

    /// Iterate entries in row order
    pub fn iter(&self) -> impl Iterator<Item = &CorpusEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_artifact() -> CorpusArtifact {
        CorpusArtifact::new(
            "test-model",
            2,
            vec![
                StatuteSection {
                    section_id: "S1".to_string(),
                    description: "theft of property".to_string(),
                },
                StatuteSection {
                    section_id: "S2".to_string(),
                    description: "assault causing hurt".to_string(),
                },
            ],
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.bin.gz");

        let artifact = sample_artifact();
        artifact.save(&path).unwrap();

        let loaded = CorpusArtifact::load(&path).unwrap();
        assert_eq!(loaded.sections, artifact.sections);
        assert_eq!(loaded.embeddings, artifact.embeddings);
        assert_eq!(loaded.dimension, 2);
        assert_eq!(loaded.model, "test-model");
    }

    #[test]
    fn test_row_count_mismatch_rejected() {
        let err = CorpusArtifact::new(
            "test-model",
            2,
            vec![StatuteSection {
                section_id: "S1".to_string(),
                description: "theft".to_string(),
            }],
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
        )
        .unwrap_err();
        assert!(matches!(err, SearchError::CorpusLoadFailed { .. }));
    }

    #[test]
    fn test_ragged_matrix_rejected() {
        let err = CorpusArtifact::new(
            "test-model",
            2,
            vec![
                StatuteSection {
                    section_id: "S1".to_string(),
                    description: "theft".to_string(),
                },
                StatuteSection {
                    section_id: "S2".to_string(),
                    description: "assault".to_string(),
                },
            ],
            vec![vec![1.0, 0.0], vec![0.0, 1.0, 2.0]],
        )
        .unwrap_err();
        assert!(matches!(err, SearchError::CorpusLoadFailed { .. }));
    }

    #[test]
    fn test_unknown_format_version_rejected() {
        let mut artifact = sample_artifact();
        artifact.format_version = 99;
        let err = artifact.validate("test").unwrap_err();
        assert!(matches!(err, SearchError::CorpusLoadFailed { .. }));
    }

    #[test]
    fn test_corrupt_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.bin.gz");
        std::fs::write(&path, b"not an artifact").unwrap();

        let err = CorpusArtifact::load(&path).unwrap_err();
        assert!(matches!(err, SearchError::CorpusLoadFailed { .. }));
    }

    #[test]
    fn test_missing_file_rejected() {
        let err = CorpusArtifact::load("/nonexistent/corpus.bin.gz").unwrap_err();
        assert!(matches!(err, SearchError::CorpusLoadFailed { .. }));
    }

    #[test]
    fn test_empty_artifact_is_valid() {
        let artifact = CorpusArtifact::new("test-model", 2, Vec::new(), Vec::new()).unwrap();
        assert!(artifact.is_empty());

        let corpus = StatuteCorpus::from_artifact(&artifact);
        assert!(corpus.is_empty());
    }

    #[test]
    fn test_corpus_preserves_row_order() {
        let artifact = sample_artifact();
        let corpus = StatuteCorpus::from_artifact(&artifact);
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.entry(0).unwrap().section_id, "S1");
        assert_eq!(corpus.entry(1).unwrap().section_id, "S2");
        assert_eq!(corpus.entry(1).unwrap().embedding, vec![0.0, 1.0]);
        assert!(corpus.entry(2).is_none());
    }

    #[test]
    fn test_duplicate_section_ids_are_legal() {
        let artifact = CorpusArtifact::new(
            "test-model",
            1,
            vec![
                StatuteSection {
                    section_id: "S1".to_string(),
                    description: "first clause".to_string(),
                },
                StatuteSection {
                    section_id: "S1".to_string(),
                    description: "second clause".to_string(),
                },
            ],
            vec![vec![0.0], vec![1.0]],
        )
        .unwrap();
        assert_eq!(artifact.len(), 2);
    }
}
