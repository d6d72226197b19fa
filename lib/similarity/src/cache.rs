//! Content-keyed cache of similarity models
//!
//! Models are keyed by the catalog fingerprint plus the feature weights,
//! never by the identity of the `Arc<Catalog>` handed in. Reloading an
//! unchanged catalog hits the cache, while any filter or edit (display text
//! included) produces a new key and therefore a fresh build with its own
//! one-hot vocabulary.
//!
//! Builds run outside the lock; the finished model is published as a whole
//! `Arc`, so readers never observe a partially built matrix.

use crate::model::SimilarityModel;
use crate::weights::FeatureWeights;
use ahash::AHashMap;
use motomatch_core::{Catalog, Fingerprint, Result};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Models kept when no capacity is given
pub const DEFAULT_CACHE_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    fingerprint: Fingerprint,
    weights: [u32; 3],
}

#[derive(Debug, Default)]
struct CacheInner {
    models: AHashMap<CacheKey, Arc<SimilarityModel>>,
    // Insertion order, oldest first
    order: VecDeque<CacheKey>,
}

/// Bounded cache of immutable similarity models
#[derive(Debug)]
pub struct ModelCache {
    weights: FeatureWeights,
    capacity: usize,
    inner: RwLock<CacheInner>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ModelCache {
    /// Create a cache building models with `weights`
    pub fn new(weights: FeatureWeights) -> Result<Self> {
        Self::with_capacity(weights, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(weights: FeatureWeights, capacity: usize) -> Result<Self> {
        weights.validate()?;
        Ok(Self {
            weights,
            capacity: capacity.max(1),
            inner: RwLock::new(CacheInner::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    /// Default weights of this cache
    pub fn weights(&self) -> &FeatureWeights {
        &self.weights
    }

    /// Model for `catalog` with the cache's default weights
    pub fn get_or_build(&self, catalog: Arc<Catalog>) -> Result<Arc<SimilarityModel>> {
        self.get_or_build_with(catalog, self.weights)
    }

    /// Model for `catalog` with explicit weights
    pub fn get_or_build_with(
        &self,
        catalog: Arc<Catalog>,
        weights: FeatureWeights,
    ) -> Result<Arc<SimilarityModel>> {
        weights.validate()?;
        let fingerprint = catalog.fingerprint();
        let key = CacheKey {
            fingerprint,
            weights: weights.key(),
        };

        if let Some(model) = self.inner.read().models.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(fingerprint = %fingerprint, "similarity model cache hit");
            return Ok(model.clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(fingerprint = %fingerprint, items = catalog.len(), "building similarity model");
        let model = Arc::new(SimilarityModel::build_with_fingerprint(catalog, fingerprint, weights));

        let mut inner = self.inner.write();
        // Another caller may have published the same snapshot meanwhile
        if let Some(existing) = inner.models.get(&key) {
            return Ok(existing.clone());
        }
        while inner.models.len() >= self.capacity {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.models.remove(&oldest);
                }
                None => break,
            }
        }
        inner.models.insert(key, model.clone());
        inner.order.push_back(key);

        Ok(model)
    }

    /// Whether a model for this snapshot and weights is cached
    pub fn contains(&self, catalog: &Catalog, weights: &FeatureWeights) -> bool {
        let key = CacheKey {
            fingerprint: catalog.fingerprint(),
            weights: weights.key(),
        };
        self.inner.read().models.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.inner.read().models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached model
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.models.clear();
        inner.order.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            capacity: self.capacity,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Cache counters
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}
