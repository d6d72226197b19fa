//! Recommendation Query
//!
//! Reads the top-K most similar listings for a target out of a similarity
//! matrix. Targets are resolved by id inside the exact snapshot the matrix
//! was built from; positional shortcuts are never taken.

use crate::engine::SimilarityMatrix;
use motomatch_core::{Catalog, Error, Item, ItemId, Result};
use serde::Serialize;

/// Recommendations returned when the caller does not ask for a count
pub const DEFAULT_TOP_K: usize = 3;

/// A recommended listing with its similarity to the target
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub item: Item,
    /// Cosine similarity in `[0, 1]`
    pub score: f32,
}

impl Recommendation {
    pub fn id(&self) -> ItemId {
        self.item.id
    }

    /// Score as a whole percentage, `round(score * 100)`
    pub fn percent(&self) -> u32 {
        score_percent(self.score)
    }
}

/// Render a similarity score as a whole percentage
pub fn score_percent(score: f32) -> u32 {
    (score.clamp(0.0, 1.0) * 100.0).round() as u32
}

/// Top-`k` listings most similar to `target_id`
///
/// # Errors
/// * [`Error::SnapshotMismatch`] if `sim` was not built from `catalog`,
///   judged by size and by content fingerprint
/// * [`Error::ItemNotFound`] if the target is not part of `catalog`
///
/// A degenerate matrix yields an empty list. Otherwise the target itself is
/// excluded, scores are sorted descending and ties keep catalog order.
pub fn recommend(
    target_id: ItemId,
    catalog: &Catalog,
    sim: &SimilarityMatrix,
    k: usize,
) -> Result<Vec<Recommendation>> {
    if catalog.len() != sim.len() || catalog.fingerprint() != sim.fingerprint() {
        return Err(Error::SnapshotMismatch {
            catalog_len: catalog.len(),
            matrix_len: sim.len(),
        });
    }
    top_k(target_id, catalog, sim, k)
}

/// Ranking step of [`recommend`] for a pair already known to match
pub(crate) fn top_k(
    target_id: ItemId,
    catalog: &Catalog,
    sim: &SimilarityMatrix,
    k: usize,
) -> Result<Vec<Recommendation>> {
    let target = catalog
        .position(target_id)
        .ok_or(Error::ItemNotFound(target_id))?;

    if sim.is_degenerate() || k == 0 {
        return Ok(Vec::new());
    }

    let mut scored: Vec<(usize, f32)> = sim
        .row(target)
        .iter()
        .copied()
        .enumerate()
        .filter(|(position, _)| *position != target)
        .collect();

    // Stable sort: equal scores stay in catalog order
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(k);

    Ok(scored
        .into_iter()
        .map(|(position, score)| Recommendation {
            item: catalog.items()[position].clone(),
            score,
        })
        .collect())
}
