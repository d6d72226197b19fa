//! Explainability for recommendations
//!
//! Reasons are recomputed from the raw attributes of the target and each
//! recommended listing. They are never inferred from the similarity score,
//! which mixes all channels together.

use crate::recommend::{score_percent, Recommendation};
use motomatch_core::{Item, ItemId};
use serde::Serialize;

/// Price gap below which two listings count as "price close"
pub const DEFAULT_PRICE_THRESHOLD: f64 = 5000.0;

/// Why a listing was recommended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    SameBrand,
    SameStyle,
    PriceClose,
}

impl Reason {
    /// Short label shown next to a recommendation
    pub fn label(&self) -> &'static str {
        match self {
            Reason::SameBrand => "同品牌",
            Reason::SameStyle => "同風格",
            Reason::PriceClose => "價格接近",
        }
    }
}

/// Compare raw attributes of a target and a candidate
///
/// `PriceClose` holds when the absolute price gap is strictly below
/// `price_threshold`.
pub fn explain(target: &Item, candidate: &Item, price_threshold: f64) -> Vec<Reason> {
    let mut reasons = Vec::with_capacity(3);
    if candidate.brand == target.brand {
        reasons.push(Reason::SameBrand);
    }
    if candidate.style == target.style {
        reasons.push(Reason::SameStyle);
    }
    if (candidate.price - target.price).abs() < price_threshold {
        reasons.push(Reason::PriceClose);
    }
    reasons
}

/// A recommendation with its presentation metadata
#[derive(Debug, Clone, Serialize)]
pub struct ExplainedResult {
    pub id: ItemId,
    /// Cosine similarity in `[0, 1]`
    pub score: f32,
    /// `round(score * 100)`
    pub percent: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<Item>,
    pub reasons: Vec<Reason>,
    /// Reason labels joined for display
    pub summary: String,
}

impl ExplainedResult {
    /// Explain a recommendation relative to its target
    pub fn from_recommendation(
        target: &Item,
        recommendation: Recommendation,
        price_threshold: f64,
        include_item: bool,
    ) -> Self {
        let reasons = explain(target, &recommendation.item, price_threshold);
        let summary = reasons
            .iter()
            .map(Reason::label)
            .collect::<Vec<_>>()
            .join("、");

        Self {
            id: recommendation.item.id,
            score: recommendation.score,
            percent: score_percent(recommendation.score),
            item: if include_item { Some(recommendation.item) } else { None },
            reasons,
            summary,
        }
    }

    /// Explain a list of recommendations, keeping their order
    pub fn from_recommendations(
        target: &Item,
        recommendations: Vec<Recommendation>,
        price_threshold: f64,
        include_item: bool,
    ) -> Vec<Self> {
        recommendations
            .into_iter()
            .map(|r| Self::from_recommendation(target, r, price_threshold, include_item))
            .collect()
    }
}

/// Response body for a "similar listings" query
#[derive(Debug, Clone, Serialize)]
pub struct SimilarResponse {
    /// The seed listing
    pub target: Item,
    /// Similar listings with explanations
    pub result: Vec<ExplainedResult>,
    pub stats: SimilarityStats,
}

impl SimilarResponse {
    pub fn new(
        target: Item,
        recommendations: Vec<Recommendation>,
        candidates_count: usize,
        price_threshold: f64,
    ) -> Self {
        let stats = SimilarityStats::compute(&target, &recommendations, candidates_count, price_threshold);
        let result =
            ExplainedResult::from_recommendations(&target, recommendations, price_threshold, true);
        Self {
            target,
            result,
            stats,
        }
    }
}

/// Summary statistics for a similarity query
#[derive(Debug, Clone, Serialize)]
pub struct SimilarityStats {
    /// Listings the target was compared against
    pub candidates_count: usize,
    /// Number of results returned
    pub results_count: usize,
    /// Average score of results
    pub avg_score: f32,
    /// Score of best result
    pub best_score: f32,
    /// Reason shared by the most results
    pub top_reason: Option<Reason>,
}

impl SimilarityStats {
    /// Compute stats from ranked recommendations
    pub fn compute(
        target: &Item,
        results: &[Recommendation],
        candidates_count: usize,
        price_threshold: f64,
    ) -> Self {
        if results.is_empty() {
            return Self {
                candidates_count,
                results_count: 0,
                avg_score: 0.0,
                best_score: 0.0,
                top_reason: None,
            };
        }

        let avg_score = results.iter().map(|r| r.score).sum::<f32>() / results.len() as f32;
        let best_score = results[0].score; // Results are sorted

        let mut counts = [0usize; 3];
        for r in results {
            for reason in explain(target, &r.item, price_threshold) {
                counts[reason as usize] += 1;
            }
        }
        // First reason wins ties
        let top_reason = [Reason::SameBrand, Reason::SameStyle, Reason::PriceClose]
            .into_iter()
            .zip(counts)
            .filter(|(_, count)| *count > 0)
            .fold(None, |best: Option<(Reason, usize)>, (reason, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((reason, count)),
            })
            .map(|(reason, _)| reason);

        Self {
            candidates_count,
            results_count: results.len(),
            avg_score,
            best_score,
            top_reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recommendation(id: u64, price: f64, brand: &str, style: &str, score: f32) -> Recommendation {
        Recommendation {
            item: Item::new(id, format!("model-{id}"), price, brand, style),
            score,
        }
    }

    fn target() -> Item {
        Item::new(0, "JET SL", 60000.0, "SYM", "通勤")
    }

    #[test]
    fn test_reasons_from_raw_attributes() {
        let candidate = Item::new(1, "JET SR", 63000.0, "SYM", "運動");
        assert_eq!(
            explain(&target(), &candidate, DEFAULT_PRICE_THRESHOLD),
            vec![Reason::SameBrand, Reason::PriceClose]
        );
    }

    #[test]
    fn test_price_threshold_is_strict() {
        let candidate = Item::new(1, "X", 65000.0, "KYMCO", "運動");
        assert!(explain(&target(), &candidate, DEFAULT_PRICE_THRESHOLD).is_empty());
    }

    #[test]
    fn test_explained_result_creation() {
        let explained = ExplainedResult::from_recommendation(
            &target(),
            recommendation(1, 61000.0, "SYM", "通勤", 0.876),
            DEFAULT_PRICE_THRESHOLD,
            true,
        );

        assert_eq!(explained.id, ItemId(1));
        assert_eq!(explained.percent, 88);
        assert!(explained.item.is_some());
        assert_eq!(explained.summary, "同品牌、同風格、價格接近");
    }

    #[test]
    fn test_explained_result_without_item() {
        let explained = ExplainedResult::from_recommendation(
            &target(),
            recommendation(1, 61000.0, "SYM", "通勤", 0.9),
            DEFAULT_PRICE_THRESHOLD,
            false,
        );
        assert!(explained.item.is_none());
    }

    #[test]
    fn test_similar_response_serialization() {
        let response = SimilarResponse::new(
            target(),
            vec![
                recommendation(1, 61000.0, "SYM", "通勤", 0.95),
                recommendation(2, 90000.0, "KYMCO", "通勤", 0.60),
            ],
            10,
            DEFAULT_PRICE_THRESHOLD,
        );
        let json = serde_json::to_string(&response).unwrap();

        assert!(json.contains("\"target\""));
        assert!(json.contains("\"result\""));
        assert!(json.contains("\"same_brand\""));
        assert!(json.contains("\"percent\":95"));
    }

    #[test]
    fn test_similarity_stats() {
        let results = vec![
            recommendation(1, 61000.0, "SYM", "通勤", 0.95),
            recommendation(2, 90000.0, "KYMCO", "通勤", 0.85),
            recommendation(3, 99000.0, "YAMAHA", "通勤", 0.75),
        ];

        let stats = SimilarityStats::compute(&target(), &results, 10, DEFAULT_PRICE_THRESHOLD);

        assert_eq!(stats.candidates_count, 10);
        assert_eq!(stats.results_count, 3);
        assert_eq!(stats.best_score, 0.95);
        assert!((stats.avg_score - 0.85).abs() < 0.01);
        assert_eq!(stats.top_reason, Some(Reason::SameStyle));
    }

    #[test]
    fn test_empty_stats() {
        let stats = SimilarityStats::compute(&target(), &[], 5, DEFAULT_PRICE_THRESHOLD);

        assert_eq!(stats.candidates_count, 5);
        assert_eq!(stats.results_count, 0);
        assert_eq!(stats.best_score, 0.0);
        assert!(stats.top_reason.is_none());
    }
}
