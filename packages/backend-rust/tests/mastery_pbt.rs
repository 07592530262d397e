//! Property-Based Tests for the learning core
//!
//! Tests the following invariants:
//! - Topological order: every competency comes after all of its prerequisites
//! - Cyclic catalogs are rejected
//! - Estimator output stays in [0, 1]; the first observation is taken verbatim
//! - Predictor is monotonic in mastery and in difficulty offset
//! - Gap detection reports only weak competencies with no weak prerequisite
//! - Path generation is idempotent and prerequisite-ordered
//! - Only accepted quiz attempts touch mastery

use std::collections::HashMap;

use proptest::prelude::*;

use skillpath_algo::{
    detect_gaps, Competency, CompetencyGraph, Difficulty, GraphError, LearningPathPlanner,
    MasteryEstimator, MasteryRecord, MasterySnapshot, PerformancePredictor, PlannerConfig,
    QuizAttempt,
};

mod common;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_f64_0_1() -> impl Strategy<Value = f64> {
    (0u64..=1000u64).prop_map(|v| v as f64 / 1000.0)
}

fn arb_difficulty() -> impl Strategy<Value = Difficulty> {
    prop_oneof![
        Just(Difficulty::Beginner),
        Just(Difficulty::Intermediate),
        Just(Difficulty::Advanced),
    ]
}

/// Random DAG: node `i` may only depend on nodes created before it, and ids are
/// shuffled so creation order says nothing about id order.
fn arb_catalog() -> impl Strategy<Value = Vec<Competency>> {
    (1usize..16)
        .prop_flat_map(|n| {
            let ids: Vec<String> = (0..n).map(|i| format!("c{i:02}")).collect();
            (
                Just(ids).prop_shuffle(),
                prop::collection::vec(prop::collection::vec(any::<bool>(), n), n),
                prop::collection::vec(arb_difficulty(), n),
            )
        })
        .prop_map(|(ids, edges, levels)| {
            ids.iter()
                .enumerate()
                .map(|(i, id)| {
                    let prerequisites: Vec<String> = (0..i)
                        .filter(|&j| edges[i][j])
                        .map(|j| ids[j].clone())
                        .collect();
                    Competency::new(id.clone(), levels[i]).with_prerequisites(prerequisites)
                })
                .collect()
        })
}

fn arb_catalog_with_snapshot() -> impl Strategy<Value = (Vec<Competency>, MasterySnapshot)> {
    arb_catalog().prop_flat_map(|catalog| {
        let n = catalog.len();
        (
            Just(catalog),
            prop::collection::vec(prop::option::of(arb_f64_0_1()), n),
        )
            .prop_map(|(catalog, scores)| {
                let snapshot: MasterySnapshot = catalog
                    .iter()
                    .zip(scores)
                    .filter_map(|(c, score)| {
                        score.map(|score| {
                            (
                                c.id.clone(),
                                MasteryRecord {
                                    score,
                                    observation_count: 1,
                                    last_updated: 0,
                                },
                            )
                        })
                    })
                    .collect();
                (catalog, snapshot)
            })
    })
}

fn positions(graph: &CompetencyGraph) -> HashMap<String, usize> {
    graph
        .topological_order()
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id.clone(), i))
        .collect()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_topological_order_respects_prerequisites(catalog in arb_catalog()) {
        let n = catalog.len();
        let graph = CompetencyGraph::build(catalog).unwrap();
        let pos = positions(&graph);
        prop_assert_eq!(pos.len(), n);
        for competency in graph.topological_order() {
            for prerequisite in &competency.prerequisites {
                prop_assert!(pos[prerequisite] < pos[&competency.id]);
            }
        }
    }

    #[test]
    fn prop_back_edge_is_rejected(len in 2usize..12) {
        let mut catalog: Vec<Competency> = (0..len)
            .map(|i| {
                let c = Competency::new(format!("n{i}"), Difficulty::Beginner);
                if i == 0 { c } else { c.with_prerequisites([format!("n{}", i - 1)]) }
            })
            .collect();
        catalog[0] = Competency::new("n0", Difficulty::Beginner)
            .with_prerequisites([format!("n{}", len - 1)]);

        let result = CompetencyGraph::build(catalog);
        prop_assert!(
            matches!(result, Err(GraphError::Cycle { .. })),
            "expected a cycle error"
        );
    }

    #[test]
    fn prop_estimator_stays_in_unit_interval(
        prior in arb_f64_0_1(),
        count in 0u32..1000,
        signal in arb_f64_0_1(),
        alpha in 0.01f64..=1.0,
    ) {
        let estimator = MasteryEstimator::new(alpha);
        let next = estimator.update(prior, count, signal);
        prop_assert!((0.0..=1.0).contains(&next));
        if count == 0 {
            prop_assert_eq!(next, signal);
        } else {
            let lo = prior.min(signal) - 1e-12;
            let hi = prior.max(signal) + 1e-12;
            prop_assert!(next >= lo && next <= hi);
        }
    }

    #[test]
    fn prop_predictor_is_monotonic(
        a in arb_f64_0_1(),
        b in arb_f64_0_1(),
        offset in -2i32..=2,
    ) {
        let predictor = PerformancePredictor::default();
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let p_low = predictor.predict(low, offset);
        let p_high = predictor.predict(high, offset);
        prop_assert!(p_low <= p_high);
        prop_assert!(p_low > 0.0 && p_high < 1.0);
        prop_assert!(predictor.predict(high, offset + 1) <= p_high);
    }

    #[test]
    fn prop_gaps_are_weak_frontier(
        (catalog, snapshot) in arb_catalog_with_snapshot(),
        threshold in arb_f64_0_1(),
    ) {
        let graph = CompetencyGraph::build(catalog).unwrap();
        let score = |id: &str| snapshot.get(id).map(|r| r.score).unwrap_or(0.0);

        let gaps = detect_gaps(&snapshot, &graph, threshold);
        for id in &gaps {
            prop_assert!(score(id) < threshold);
            let competency = graph.get(id).unwrap();
            for prerequisite in &competency.prerequisites {
                prop_assert!(score(prerequisite) >= threshold);
            }
        }
        for pair in gaps.windows(2) {
            prop_assert!(score(&pair[0]) <= score(&pair[1]));
        }
    }

    #[test]
    fn prop_path_is_idempotent_and_ordered(
        (catalog, snapshot) in arb_catalog_with_snapshot(),
        target_picks in prop::collection::vec(any::<prop::sample::Index>(), 1..4),
        level in arb_difficulty(),
    ) {
        let targets: Vec<String> = target_picks
            .iter()
            .map(|pick| catalog[pick.index(catalog.len())].id.clone())
            .collect();
        let graph = CompetencyGraph::build(catalog).unwrap();
        let planner = LearningPathPlanner::new(
            &graph,
            PerformancePredictor::default(),
            PlannerConfig::default(),
        );

        let first = planner.generate_path(&snapshot, targets.as_slice(), level).unwrap();
        let second = planner.generate_path(&snapshot, targets.as_slice(), level).unwrap();
        prop_assert_eq!(&first, &second);

        let in_path: HashMap<&str, usize> = first
            .competency_ids()
            .into_iter()
            .enumerate()
            .map(|(i, id)| (id, i))
            .collect();
        for target in &targets {
            prop_assert!(in_path.contains_key(target.as_str()));
        }
        for step in &first.steps {
            let competency = graph.get(&step.competency_id).unwrap();
            for prerequisite in &competency.prerequisites {
                prop_assert!(in_path[prerequisite.as_str()] < in_path[step.competency_id.as_str()]);
            }
        }
    }

    #[test]
    fn prop_only_accepted_attempts_update_mastery(
        attempts in prop::collection::vec(prop::collection::vec(0usize..5, 0..5), 1..12),
    ) {
        let engine = common::test_engine();
        let mut accepted = 0u32;
        for selected in attempts {
            let attempt = QuizAttempt {
                quiz_id: common::ARRAYS_QUIZ.to_string(),
                selected_indices: selected,
            };
            if engine.grade("prop-user", &attempt).is_ok() {
                accepted += 1;
            }
        }

        let snapshot = engine.mastery_snapshot("prop-user").unwrap();
        let count = snapshot.get("arrays").map(|r| r.observation_count).unwrap_or(0);
        prop_assert_eq!(count, accepted);
        if let Some(record) = snapshot.get("arrays") {
            prop_assert!((0.0..=1.0).contains(&record.score));
        }
    }
}
