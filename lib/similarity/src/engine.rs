//! Similarity Engine
//!
//! Builds the pairwise cosine-similarity matrix of a feature matrix:
//! rows are L2-normalized (a zero norm counts as 1, so zero rows stay zero)
//! and the Gram matrix of the unit rows is taken.

use crate::encoder::FeatureMatrix;
use motomatch_core::{FeatureVector, Fingerprint};
use rayon::prelude::*;
use serde::Serialize;

/// Square, symmetric N×N cosine-similarity matrix, row-major
///
/// Entries lie in `[0, 1]`. With fewer than two listings the matrix is
/// degenerate: all zeros, meaning "no recommendations available".
/// The matrix remembers the fingerprint of the snapshot it describes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityMatrix {
    fingerprint: Fingerprint,
    n: usize,
    data: Vec<f32>,
    degenerate: bool,
}

impl SimilarityMatrix {
    /// All-zero matrix of the given size for one snapshot
    pub fn zeros(n: usize, fingerprint: Fingerprint) -> Self {
        Self {
            fingerprint,
            n,
            data: vec![0.0; n * n],
            degenerate: true,
        }
    }

    /// Fingerprint of the snapshot the matrix was built from
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Side length
    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Whether the matrix carries no usable scores
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    /// Score between two row positions
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.data[i * self.n + j]
    }

    /// Scores of one row position against every position
    #[inline]
    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// Computes cosine-similarity matrices
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityEngine;

impl SimilarityEngine {
    /// Build the similarity matrix for an encoded snapshot
    ///
    /// Each entry is a fixed-order dot product, so building twice from the
    /// same features yields bit-identical matrices even though rows are
    /// computed in parallel.
    pub fn build(features: &FeatureMatrix) -> SimilarityMatrix {
        let n = features.len();
        if n < 2 {
            return SimilarityMatrix::zeros(n, features.fingerprint());
        }

        let unit_rows: Vec<FeatureVector> = features
            .rows()
            .iter()
            .map(FeatureVector::normalized)
            .collect();

        // Upper triangle, row i holds columns i..n
        let upper: Vec<Vec<f32>> = (0..n)
            .into_par_iter()
            .map(|i| {
                (i..n)
                    .map(|j| unit_rows[i].dot(&unit_rows[j]).clamp(0.0, 1.0))
                    .collect()
            })
            .collect();

        let mut data = vec![0.0f32; n * n];
        for (i, row) in upper.iter().enumerate() {
            for (offset, &score) in row.iter().enumerate() {
                let j = i + offset;
                data[i * n + j] = score;
                data[j * n + i] = score;
            }
        }

        SimilarityMatrix {
            fingerprint: features.fingerprint(),
            n,
            data,
            degenerate: false,
        }
    }
}
