use crate::loader::load_catalog;
use anyhow::Result as AnyResult;
use motomatch_core::{Catalog, Filter, ItemId, Result};
use motomatch_intake::SessionStore;
use motomatch_similarity::{FeatureWeights, ModelCache, Recommendation, SimilarityModel};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Owns the live catalog snapshot, its similarity models and the sessions
///
/// The catalog is swapped whole on reload; readers holding the previous
/// `Arc` keep a consistent view until they drop it.
pub struct CatalogManager {
    source: Option<PathBuf>,
    catalog: RwLock<Arc<Catalog>>,
    models: ModelCache,
    sessions: SessionStore,
}

impl CatalogManager {
    /// Load the catalog file at `path`
    pub fn open<P: AsRef<Path>>(path: P, weights: FeatureWeights) -> AnyResult<Self> {
        let path = path.as_ref().to_path_buf();
        let catalog = load_catalog(&path)?;
        let mut manager = Self::new(catalog, weights)?;
        manager.source = Some(path);
        Ok(manager)
    }

    /// Serve an in-memory catalog
    pub fn new(catalog: Catalog, weights: FeatureWeights) -> Result<Self> {
        Ok(Self {
            source: None,
            catalog: RwLock::new(Arc::new(catalog)),
            models: ModelCache::new(weights)?,
            sessions: SessionStore::new(),
        })
    }

    #[inline]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Current snapshot
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> Arc<Catalog> {
        self.catalog.read().clone()
    }

    /// Replace the snapshot
    pub fn replace(&self, catalog: Catalog) {
        *self.catalog.write() = Arc::new(catalog);
    }

    /// Re-read the source file and swap in the new snapshot
    ///
    /// Returns the new snapshot. An identical file keeps hitting the cached
    /// models since they are keyed by content.
    pub fn reload(&self) -> AnyResult<Arc<Catalog>> {
        let path = self
            .source
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("catalog was not loaded from a file"))?;
        let catalog = Arc::new(load_catalog(path)?);
        let previous = std::mem::replace(&mut *self.catalog.write(), catalog.clone());
        info!(
            items = catalog.len(),
            changed = previous.fingerprint() != catalog.fingerprint(),
            "catalog reloaded"
        );
        Ok(catalog)
    }

    pub fn weights(&self) -> &FeatureWeights {
        self.models.weights()
    }

    pub fn models(&self) -> &ModelCache {
        &self.models
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Model over the whole current snapshot
    pub fn model(&self) -> Result<Arc<SimilarityModel>> {
        self.models.get_or_build(self.catalog())
    }

    /// Model over the listings of the current snapshot accepted by `filter`
    pub fn model_for(&self, filter: &dyn Filter) -> Result<Arc<SimilarityModel>> {
        let filtered = self.catalog().filter(filter);
        self.models.get_or_build(Arc::new(filtered))
    }

    /// Top-`k` listings similar to `target` within the filtered snapshot
    pub fn recommend(
        &self,
        target: ItemId,
        filter: &dyn Filter,
        k: usize,
    ) -> Result<Vec<Recommendation>> {
        self.model_for(filter)?.recommend(target, k)
    }
}
