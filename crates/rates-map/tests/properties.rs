// Property-based tests for the scoring primitives.

use proptest::prelude::*;
use rates_map::units::UNIT_CLASSES;
use rates_map::{
    ConfidenceThresholds, CrosswalkIndex, MatchScorer, Resolver, SimilarityAlgorithm,
    extract_keywords, keyword_overlap, units_compatible,
};
use rates_model::{CrosswalkEntry, Rate};

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

fn all_unit_spellings() -> Vec<&'static str> {
    UNIT_CLASSES
        .iter()
        .flat_map(|(_, spellings)| spellings.iter().copied())
        .collect()
}

fn arb_unit() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => prop::sample::select(all_unit_spellings()).prop_map(str::to_string),
        1 => prop::sample::select(all_unit_spellings())
            .prop_flat_map(|a| prop::sample::select(all_unit_spellings()).prop_map(move |b| format!("{a}/{b}"))),
        1 => r"[a-zA-Z ]{0,6}",
    ]
}

fn arb_text() -> impl Strategy<Value = String> {
    r"[a-zA-Z ,/]{0,40}"
}

#[test]
fn unit_compatibility_is_symmetric_over_the_tables() {
    let spellings = all_unit_spellings();
    for a in &spellings {
        for b in &spellings {
            assert_eq!(
                units_compatible(a, b),
                units_compatible(b, a),
                "{a:?} vs {b:?}"
            );
        }
        assert!(units_compatible(a, a), "{a:?} not compatible with itself");
    }
}

proptest! {
    #![proptest_config(config())]

    #[test]
    fn unit_compatibility_is_symmetric(a in arb_unit(), b in arb_unit()) {
        prop_assert_eq!(units_compatible(&a, &b), units_compatible(&b, &a));
    }

    #[test]
    fn similarity_is_symmetric_and_bounded(a in arb_text(), b in arb_text()) {
        for algorithm in [SimilarityAlgorithm::Indel, SimilarityAlgorithm::JaroWinkler] {
            let similarity = algorithm.build();
            let ab = similarity.similarity(&a, &b);
            let ba = similarity.similarity(&b, &a);
            prop_assert!((0.0..=1.0).contains(&ab));
            prop_assert!((ab - ba).abs() < 1e-9);
            if a != b {
                prop_assert!(ab < 1.0);
            }
        }
    }

    #[test]
    fn keyword_overlap_is_bounded(a in arb_text(), b in arb_text()) {
        let overlap = keyword_overlap(&extract_keywords(&a), &extract_keywords(&b));
        prop_assert!((0.0..=1.0).contains(&overlap));
    }

    #[test]
    fn total_score_stays_in_range(name in arb_text(), unit in arb_unit(), description in arb_text()) {
        let entry = CrosswalkEntry {
            level4_code: "1.1.1.1".to_string(),
            level2_code: "1.1".to_string(),
            description,
            unit: "m2".to_string(),
            matched_keywords: "wall, lining".to_string(),
            ..CrosswalkEntry::default()
        };
        let rate = Rate::new("R", name, unit, "1.1");
        let score = MatchScorer::default().score(&rate, &entry);
        prop_assert!((0.0..=1.0 + 1e-9).contains(&score.total_score));
        prop_assert_eq!(score.confidence, ConfidenceThresholds::default().categorize(score.total_score));
    }

    #[test]
    fn resolver_never_picks_a_lower_score(
        name in arb_text(),
        descriptions in prop::collection::vec(arb_text(), 1..6),
    ) {
        let entries: Vec<CrosswalkEntry> = descriptions
            .into_iter()
            .enumerate()
            .map(|(i, description)| CrosswalkEntry {
                level4_code: format!("2.1.1.{i}"),
                level2_code: "2.1".to_string(),
                description,
                unit: "nr".to_string(),
                ..CrosswalkEntry::default()
            })
            .collect();
        let index = CrosswalkIndex::build(entries).unwrap();
        let scorer = MatchScorer::default();
        let resolver = Resolver::new(&index, &scorer);
        let rate = Rate::new("R", name, "nr", "2.1");

        let best = resolver.resolve(&rate).unwrap();
        for candidate in index.lookup("2.1") {
            let score = scorer.score(&rate, candidate);
            prop_assert!(score.total_score <= best.score.total_score);
        }
        let ranked = resolver.rank(&rate);
        prop_assert_eq!(ranked[0].entry.level4_code.as_str(), best.entry.level4_code.as_str());
    }
}
