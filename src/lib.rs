//! # MotoMatch
//!
//! Used-motorcycle recommendations over a scraped listing catalog.
//!
//! Each listing is described by price, brand and style. MotoMatch turns
//! those into weighted feature vectors, builds a cosine similarity matrix
//! for a catalog snapshot and answers "show me bikes like this one" with
//! short explanations ("同品牌、價格接近").
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! motomatch --catalog data/motorcycles.json --http-port 8080
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use motomatch::prelude::*;
//! use std::sync::Arc;
//!
//! let catalog = Catalog::new(vec![
//!     Item::new(0, "JET SL", 50000.0, "SYM", "通勤"),
//!     Item::new(1, "JET SR", 52000.0, "SYM", "通勤"),
//!     Item::new(2, "勁戰", 150000.0, "YAMAHA", "運動"),
//! ]).unwrap();
//!
//! let model = SimilarityModel::build(Arc::new(catalog), FeatureWeights::default()).unwrap();
//! let similar = model.recommend(ItemId(0), 3).unwrap();
//! assert_eq!(similar[0].id(), ItemId(1));
//! ```
//!
//! ## Crate Structure
//!
//! - [`motomatch-core`](https://docs.rs/motomatch-core) - Listings, catalog snapshots, filters
//! - [`motomatch-similarity`](https://docs.rs/motomatch-similarity) - Encoding, similarity matrix, recommendations
//! - [`motomatch-intake`](https://docs.rs/motomatch-intake) - Guided intake conversation
//! - [`motomatch-storage`](https://docs.rs/motomatch-storage) - Catalog ingestion and live snapshot
//! - [`motomatch-api`](https://docs.rs/motomatch-api) - REST API

// Re-export core types
pub use motomatch_core::{
    Catalog, Error, Filter, Fingerprint, Item, ItemFilter, ItemId, Page, Result,
};

// Re-export similarity engine
pub use motomatch_similarity::{
    build_similarity_matrix, recommend, ExplainedResult, FeatureWeights, ModelCache, Reason,
    Recommendation, SimilarResponse, SimilarityMatrix, SimilarityModel, WeightPreset,
};

// Re-export intake
pub use motomatch_intake::{IntakeStage, Session, SessionStore};

// Re-export storage
pub use motomatch_storage::{load_catalog, parse_catalog, CatalogManager};

// Re-export API
pub use motomatch_api::RestApi;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Catalog, Error, Filter, Item, ItemFilter, ItemId, Result,
        FeatureWeights, Recommendation, SimilarityModel, WeightPreset,
        IntakeStage, Session,
        CatalogManager, RestApi,
    };
}
