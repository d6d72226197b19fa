//! Similarity model: one catalog snapshot and the matrix built from it
//!
//! A model never outlives its snapshot. It owns an `Arc` of the exact
//! catalog it was built from, so a query can only ever be resolved against
//! the rows the matrix describes.

use crate::encoder::FeatureEncoder;
use crate::engine::{SimilarityEngine, SimilarityMatrix};
use crate::recommend::{top_k, Recommendation};
use crate::weights::FeatureWeights;
use motomatch_core::{Catalog, Fingerprint, ItemId, Result};
use serde::Serialize;
use std::sync::Arc;

/// Immutable similarity model for one catalog snapshot
#[derive(Debug)]
pub struct SimilarityModel {
    catalog: Arc<Catalog>,
    fingerprint: Fingerprint,
    weights: FeatureWeights,
    brands: Vec<String>,
    styles: Vec<String>,
    matrix: SimilarityMatrix,
}

impl SimilarityModel {
    /// Encode the snapshot and build its similarity matrix
    pub fn build(catalog: Arc<Catalog>, weights: FeatureWeights) -> Result<Self> {
        weights.validate()?;
        let fingerprint = catalog.fingerprint();
        Ok(Self::build_with_fingerprint(catalog, fingerprint, weights))
    }

    pub(crate) fn build_with_fingerprint(
        catalog: Arc<Catalog>,
        fingerprint: Fingerprint,
        weights: FeatureWeights,
    ) -> Self {
        let features = FeatureEncoder::new(weights).encode_with_fingerprint(&catalog, fingerprint);
        let matrix = SimilarityEngine::build(&features);
        let brands = features.brands().to_vec();
        let styles = features.styles().to_vec();

        Self {
            catalog,
            fingerprint,
            weights,
            brands,
            styles,
            matrix,
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    pub fn weights(&self) -> &FeatureWeights {
        &self.weights
    }

    pub fn matrix(&self) -> &SimilarityMatrix {
        &self.matrix
    }

    /// Feature dimension used by this build
    pub fn dim(&self) -> usize {
        1 + self.brands.len() + self.styles.len()
    }

    /// Whether this model can produce recommendations at all
    pub fn is_degenerate(&self) -> bool {
        self.matrix.is_degenerate()
    }

    /// Top-`k` listings most similar to `target_id` within this snapshot
    pub fn recommend(&self, target_id: ItemId, k: usize) -> Result<Vec<Recommendation>> {
        // The matrix was built from this very catalog
        top_k(target_id, &self.catalog, &self.matrix, k)
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            fingerprint: self.fingerprint.to_hex(),
            items: self.catalog.len(),
            dim: self.dim(),
            brands: self.brands.clone(),
            styles: self.styles.clone(),
            degenerate: self.is_degenerate(),
            weights: self.weights,
        }
    }
}

/// Serializable summary of a model
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub fingerprint: String,
    pub items: usize,
    pub dim: usize,
    pub brands: Vec<String>,
    pub styles: Vec<String>,
    pub degenerate: bool,
    pub weights: FeatureWeights,
}
