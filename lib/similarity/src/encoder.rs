//! Feature Encoder
//!
//! Converts a catalog snapshot into a dense feature matrix. Each row is the
//! concatenation of
//!
//! 1. the price channel: `price / max_price`, scaled by `price_weight`
//! 2. a one-hot block over the snapshot's distinct brands, scaled by `brand_weight`
//! 3. a one-hot block over the snapshot's distinct styles, scaled by `style_weight`
//!
//! The vocabularies come from the snapshot itself, so a matrix built from a
//! filtered catalog has different columns than one built from the full
//! catalog. One-hot columns are ordered lexicographically.

use crate::weights::FeatureWeights;
use ahash::AHashMap;
use motomatch_core::{Catalog, FeatureVector, Fingerprint};

/// Encoded feature rows of one catalog snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    fingerprint: Fingerprint,
    rows: Vec<FeatureVector>,
    brands: Vec<String>,
    styles: Vec<String>,
}

impl FeatureMatrix {
    /// Fingerprint of the snapshot these rows were encoded from
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Number of rows (listings)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Width of every row: `1 + brands + styles`
    pub fn dim(&self) -> usize {
        1 + self.brands.len() + self.styles.len()
    }

    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }

    pub fn row(&self, position: usize) -> Option<&FeatureVector> {
        self.rows.get(position)
    }

    /// Brand columns in order
    pub fn brands(&self) -> &[String] {
        &self.brands
    }

    /// Style columns in order
    pub fn styles(&self) -> &[String] {
        &self.styles
    }

    pub fn into_rows(self) -> Vec<FeatureVector> {
        self.rows
    }
}

/// Turns listings into weighted feature vectors
#[derive(Debug, Clone, Default)]
pub struct FeatureEncoder {
    weights: FeatureWeights,
}

impl FeatureEncoder {
    pub fn new(weights: FeatureWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &FeatureWeights {
        &self.weights
    }

    /// Encode every listing of the snapshot, in catalog order
    pub fn encode(&self, catalog: &Catalog) -> FeatureMatrix {
        self.encode_with_fingerprint(catalog, catalog.fingerprint())
    }

    /// Encode with a fingerprint the caller already computed for `catalog`
    pub(crate) fn encode_with_fingerprint(
        &self,
        catalog: &Catalog,
        fingerprint: Fingerprint,
    ) -> FeatureMatrix {
        let brands = catalog.brands();
        let styles = catalog.styles();
        let brand_columns = column_index(&brands, 1);
        let style_columns = column_index(&styles, 1 + brands.len());
        let dim = 1 + brands.len() + styles.len();

        let max_price = catalog
            .iter()
            .map(|item| item.price)
            .fold(0.0f64, f64::max);
        // All-zero prices would divide by zero
        let denominator = if max_price > 0.0 { max_price } else { 1.0 };

        let rows = catalog
            .iter()
            .map(|item| {
                let mut components = vec![0.0f32; dim];
                components[0] = (item.price / denominator) as f32 * self.weights.price_weight;
                if let Some(&col) = brand_columns.get(item.brand.as_str()) {
                    components[col] = self.weights.brand_weight;
                }
                if let Some(&col) = style_columns.get(item.style.as_str()) {
                    components[col] = self.weights.style_weight;
                }
                FeatureVector::new(components)
            })
            .collect();

        FeatureMatrix {
            fingerprint,
            rows,
            brands,
            styles,
        }
    }
}

fn column_index(vocabulary: &[String], offset: usize) -> AHashMap<&str, usize> {
    vocabulary
        .iter()
        .enumerate()
        .map(|(i, value)| (value.as_str(), offset + i))
        .collect()
}
