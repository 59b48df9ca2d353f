//! # Vector Index Module
//!
//! ## Purpose
//! Exact k-nearest-neighbor search over the corpus embedding matrix under
//! squared Euclidean distance. Built once offline, held read-only for the
//! life of an active pairing, replaced wholesale on rebuild.
//!
//! ## Input/Output Specification
//! - **Input**: Row-ordered embedding matrix at build time; query vector + k at search time
//! - **Output**: `min(k, size)` `(row, distance)` pairs, non-decreasing distance,
//!   ties broken by ascending row index
//! - **Metric**: Squared Euclidean distance (not cosine), matching how the
//!   corpus embeddings were produced
//!
//! ## Key Features
//! - Exact brute-force scan, parallelized across rows
//! - Deterministic, reproducible rankings for identical inputs
//! - Empty index is valid: `search` returns an empty sequence, never an error

use crate::errors::{Result, SearchError};
use rayon::prelude::*;

/// Exact nearest-neighbor index over a flat row-major embedding matrix
#[derive(Debug, Clone)]
pub struct VectorIndex {
    dimension: usize,
    rows: usize,
    data: Vec<f32>,
}

impl VectorIndex {
    /// Build an index from row vectors. Every vector must have the declared
    /// dimension; an empty vector sequence produces a valid empty index.
    pub fn build(dimension: usize, vectors: &[Vec<f32>]) -> Result<Self> {
        if dimension == 0 && !vectors.is_empty() {
            return Err(SearchError::ValidationFailed {
                field: "dimension".to_string(),
                reason: "cannot index vectors of dimension zero".to_string(),
            });
        }

        let mut data = Vec::with_capacity(vectors.len() * dimension);
        for vector in vectors {
            if vector.len() != dimension {
                return Err(SearchError::DimensionMismatch {
                    expected: dimension,
                    actual: vector.len(),
                });
            }
            data.extend_from_slice(vector);
        }

        Ok(Self {
            dimension,
            rows: vectors.len(),
            data,
        })
    }

    /// Number of indexed vectors
    pub fn size(&self) -> usize {
        self.rows
    }

    /// Whether the index holds no vectors
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Dimension of every indexed vector
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Return the `min(k, size)` nearest rows to the query by squared
    /// Euclidean distance, sorted by non-decreasing distance with ties broken
    /// by ascending row index. `k == 0` yields an empty sequence.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if self.rows == 0 || k == 0 {
            return Ok(Vec::new());
        }

        if query.len() != self.dimension {
            return Err(SearchError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .data
            .par_chunks_exact(self.dimension)
            .enumerate()
            .map(|(row, vector)| (row, squared_euclidean(query, vector)))
            .collect();

        scored.sort_unstable_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(k.min(self.rows));

        Ok(scored)
    }
}

/// Squared Euclidean distance between two equal-length vectors
fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_index() -> VectorIndex {
        VectorIndex::build(
            3,
            &[
                vec![1.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0],
                vec![0.0, 0.0, 1.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_exact_distances() {
        let index = unit_index();
        let results = index.search(&[1.0, 0.0, 0.0], 3).unwrap();

        assert_eq!(results[0], (0, 0.0));
        assert_eq!(results[1].1, 2.0);
        assert_eq!(results[2].1, 2.0);
    }

    #[test]
    fn test_results_sorted_by_distance() {
        let index = VectorIndex::build(
            2,
            &[
                vec![3.0, 0.0],
                vec![1.0, 0.0],
                vec![2.0, 0.0],
                vec![0.5, 0.0],
            ],
        )
        .unwrap();

        let results = index.search(&[0.0, 0.0], 4).unwrap();
        for pair in results.windows(2) {
            assert!(pair[0].1 <= pair[1].1);
        }
        assert_eq!(results[0].0, 3);
        assert_eq!(results[3].0, 0);
    }

    #[test]
    fn test_ties_broken_by_row_index() {
        let index = VectorIndex::build(
            2,
            &[vec![1.0, 0.0], vec![0.0, 0.0], vec![1.0, 0.0]],
        )
        .unwrap();

        let results = index.search(&[1.0, 0.0], 3).unwrap();
        // Rows 0 and 2 are identical; row 0 must come first
        assert_eq!(results[0].0, 0);
        assert_eq!(results[1].0, 2);
        assert_eq!(results[2].0, 1);
    }

    #[test]
    fn test_k_larger_than_index() {
        let index = unit_index();
        let results = index.search(&[1.0, 0.0, 0.0], 100).unwrap();
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_k_zero_yields_empty() {
        let index = unit_index();
        let results = index.search(&[1.0, 0.0, 0.0], 0).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_empty_index_yields_empty() {
        let index = VectorIndex::build(3, &[]).unwrap();
        assert!(index.is_empty());
        let results = index.search(&[1.0, 0.0, 0.0], 5).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_build_rejects_ragged_rows() {
        let err = VectorIndex::build(3, &[vec![1.0, 0.0]]).unwrap_err();
        assert!(matches!(
            err,
            SearchError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_search_rejects_wrong_query_dimension() {
        let index = unit_index();
        let err = index.search(&[1.0, 0.0], 2).unwrap_err();
        assert!(matches!(err, SearchError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_search_is_deterministic() {
        let index = VectorIndex::build(
            2,
            &(0..64).map(|i| vec![(i % 7) as f32, (i % 5) as f32]).collect::<Vec<_>>(),
        )
        .unwrap();

        let first = index.search(&[1.5, 2.5], 10).unwrap();
        let second = index.search(&[1.5, 2.5], 10).unwrap();
        assert_eq!(first, second);
    }
}
