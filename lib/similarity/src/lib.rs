//! # MotoMatch Similarity
//!
//! Content-based similarity engine for listing catalogs.
//!
//! Every listing is reduced to three channels (price, brand, style), turned
//! into a weighted feature vector and compared by cosine similarity.
//!
//! ## Features
//!
//! - **Feature Encoding**: price scaled into `[0, 1]`, one-hot brand and style blocks
//! - **Configurable Weights**: per-channel weights with named presets
//! - **Similarity Matrix**: zero-norm guarded cosine similarity for every pair
//! - **Top-K Queries**: id-based lookup, deterministic tie-breaking
//! - **Explainability**: "same brand / same style / price close" reasons
//! - **Model Cache**: content-fingerprint keyed, atomically published models
//!
//! ## Example
//!
//! ```rust
//! use motomatch_core::{Catalog, Item, ItemId};
//! use motomatch_similarity::{FeatureWeights, SimilarityModel};
//! use std::sync::Arc;
//!
//! let catalog = Arc::new(Catalog::new(vec![
//!     Item::new(0, "JET SL", 50000.0, "SYM", "通勤"),
//!     Item::new(1, "JET SR", 52000.0, "SYM", "通勤"),
//!     Item::new(2, "勁戰", 150000.0, "YAMAHA", "運動"),
//! ]).unwrap());
//!
//! let model = SimilarityModel::build(catalog, FeatureWeights::default()).unwrap();
//! let similar = model.recommend(ItemId(0), 1).unwrap();
//! assert_eq!(similar[0].item.id, ItemId(1));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Catalog   │────>│   Encoder   │────>│   Engine    │
//! │ (snapshot)  │     │ (features)  │     │  (N × N)    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!       │                                        │
//!       │              ┌─────────────┐           │
//!       └─────────────>│ ModelCache  │<──────────┘
//!                      │(fingerprint)│
//!                      └─────────────┘
//!                             │
//!                      ┌─────────────┐
//!                      │ Recommend + │
//!                      │   Explain   │
//!                      └─────────────┘
//! ```

pub mod cache;
pub mod encoder;
pub mod engine;
pub mod explain;
pub mod model;
pub mod recommend;
pub mod weights;

// Re-export main types for convenience
pub use cache::{CacheStats, ModelCache, DEFAULT_CACHE_CAPACITY};
pub use encoder::{FeatureEncoder, FeatureMatrix};
pub use engine::{SimilarityEngine, SimilarityMatrix};
pub use explain::{
    explain, ExplainedResult, Reason, SimilarResponse, SimilarityStats, DEFAULT_PRICE_THRESHOLD,
};
pub use model::{ModelInfo, SimilarityModel};
pub use recommend::{recommend, score_percent, Recommendation, DEFAULT_TOP_K};
pub use weights::{FeatureWeights, WeightPreset};

/// Encode a catalog and build its similarity matrix in one step
pub fn build_similarity_matrix(
    catalog: &motomatch_core::Catalog,
    weights: FeatureWeights,
) -> SimilarityMatrix {
    SimilarityEngine::build(&FeatureEncoder::new(weights).encode(catalog))
}
