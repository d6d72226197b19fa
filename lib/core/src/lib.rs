//! # MotoMatch Core
//!
//! Core data structures for the MotoMatch listing recommender.
//!
//! - [`Item`] - A used-motorcycle listing with its scoring attributes
//! - [`Catalog`] - Immutable, id-indexed snapshot of listings
//! - [`ItemFilter`] - Browse filter producing new snapshots
//! - [`FeatureVector`] - Dense per-listing feature vector
//! - [`Fingerprint`] - Content hash identifying a snapshot
//!
//! ## Example
//!
//! ```rust
//! use motomatch_core::{Catalog, Item, ItemFilter, ItemId};
//!
//! let catalog = Catalog::new(vec![
//!     Item::new(0, "JET SL 125", 50000.0, "SYM", "通勤"),
//!     Item::new(1, "勁戰六代", 52000.0, "YAMAHA", "運動"),
//! ]).unwrap();
//!
//! let cheap = catalog.filter(&ItemFilter::new().with_max_price(50000.0));
//! assert_eq!(cheap.len(), 1);
//! assert!(cheap.contains(ItemId(0)));
//! ```

pub mod catalog;
pub mod error;
pub mod filter;
pub mod item;
pub mod vector;

pub use catalog::{Catalog, Fingerprint, Page, DEFAULT_PAGE_SIZE};
pub use error::{Error, Result};
pub use filter::{normalize_place, Filter, ItemFilter};
pub use item::{
    coerce_price, Item, ItemId, DEFAULT_BRAND, DEFAULT_IMAGE_URL, DEFAULT_MODEL, DEFAULT_STORE,
    DEFAULT_STYLE,
};
pub use vector::FeatureVector;
