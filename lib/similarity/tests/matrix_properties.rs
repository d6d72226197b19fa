//! Property tests for similarity matrix and recommendation invariants.

use proptest::prelude::*;

use motomatch_core::{Catalog, Item, ItemId};
use motomatch_similarity::{build_similarity_matrix, recommend, FeatureWeights};

const BRANDS: [&str; 4] = ["SYM", "YAMAHA", "KYMCO", "其他"];
const STYLES: [&str; 3] = ["通勤", "運動", "休閒"];

fn item_strategy() -> impl Strategy<Value = (f64, usize, usize)> {
    (
        prop_oneof![Just(0.0), 0.0f64..300_000.0],
        0..BRANDS.len(),
        0..STYLES.len(),
    )
}

fn catalog_strategy(max_len: usize) -> impl Strategy<Value = Catalog> {
    prop::collection::vec(item_strategy(), 0..max_len).prop_map(|rows| {
        let items = rows
            .into_iter()
            .enumerate()
            .map(|(i, (price, brand, style))| {
                Item::new(i as u64, format!("model-{i}"), price, BRANDS[brand], STYLES[style])
            })
            .collect();
        Catalog::new(items).unwrap()
    })
}

fn weights_strategy() -> impl Strategy<Value = FeatureWeights> {
    (0.0f32..3.0, 0.0f32..3.0, 0.0f32..3.0).prop_map(|(p, b, s)| FeatureWeights::new(p, b, s))
}

proptest! {
    #[test]
    fn prop_square_symmetric_bounded(catalog in catalog_strategy(24), weights in weights_strategy()) {
        let sim = build_similarity_matrix(&catalog, weights);
        let n = catalog.len();
        prop_assert_eq!(sim.len(), n);
        prop_assert_eq!(sim.as_slice().len(), n * n);
        for i in 0..n {
            for j in 0..n {
                let score = sim.get(i, j);
                prop_assert!((0.0..=1.0).contains(&score));
                prop_assert_eq!(score.to_bits(), sim.get(j, i).to_bits());
            }
        }
    }

    #[test]
    fn prop_diagonal_one_for_nonzero_vectors(catalog in catalog_strategy(24)) {
        // Positive brand weight means no zero vectors
        let sim = build_similarity_matrix(&catalog, FeatureWeights::default());
        if catalog.len() >= 2 {
            for i in 0..catalog.len() {
                prop_assert!((sim.get(i, i) - 1.0).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn prop_build_is_deterministic(catalog in catalog_strategy(24), weights in weights_strategy()) {
        let a = build_similarity_matrix(&catalog, weights);
        let b = build_similarity_matrix(&catalog, weights);
        let a_bits: Vec<u32> = a.as_slice().iter().map(|x| x.to_bits()).collect();
        let b_bits: Vec<u32> = b.as_slice().iter().map(|x| x.to_bits()).collect();
        prop_assert_eq!(a_bits, b_bits);
    }

    #[test]
    fn prop_recommend_contract(catalog in catalog_strategy(24), k in 0usize..6, pick in any::<prop::sample::Index>()) {
        prop_assume!(!catalog.is_empty());
        let sim = build_similarity_matrix(&catalog, FeatureWeights::default());
        let target = catalog.items()[pick.index(catalog.len())].id;

        let results = recommend(target, &catalog, &sim, k).unwrap();
        prop_assert!(results.len() <= k);
        prop_assert!(results.len() <= catalog.len() - 1);
        prop_assert!(results.iter().all(|r| r.item.id != target));
        for pair in results.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                let a = catalog.position(pair[0].item.id).unwrap();
                let b = catalog.position(pair[1].item.id).unwrap();
                prop_assert!(a < b);
            }
        }
    }

    #[test]
    fn prop_brand_weight_monotonic(price_a in 1.0f64..200_000.0, price_b in 1.0f64..200_000.0, brand_weight in 0.01f32..3.0) {
        let catalog = Catalog::new(vec![
            Item::new(0, "a", price_a, "SYM", "通勤"),
            Item::new(1, "b", price_b, "SYM", "運動"),
            Item::new(2, "c", 100_000.0, "KYMCO", "休閒"),
        ]).unwrap();

        let without = build_similarity_matrix(&catalog, FeatureWeights::new(1.0, 0.0, 1.0));
        let with = build_similarity_matrix(&catalog, FeatureWeights::new(1.0, brand_weight, 1.0));
        prop_assert!(with.get(0, 1) > without.get(0, 1));
    }

    #[test]
    fn prop_unknown_target_is_not_found(catalog in catalog_strategy(12)) {
        let sim = build_similarity_matrix(&catalog, FeatureWeights::default());
        let missing = ItemId(catalog.len() as u64 + 1000);
        prop_assert!(recommend(missing, &catalog, &sim, 3).is_err());
    }
}
