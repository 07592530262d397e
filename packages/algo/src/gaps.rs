//! Gap Detector
//!
//! A competency is *weak* when its mastery is strictly below the threshold.
//! Only the frontier of weak competencies is reported: a weak competency whose
//! prerequisites include another weak one is left out, since remediating the
//! prerequisite comes first.

use serde::{Deserialize, Serialize};

use crate::graph::CompetencyGraph;
use crate::types::{score_of, CompetencyId, MasterySnapshot};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gap {
    pub competency_id: CompetencyId,
    pub score: f64,
}

/// Frontier gaps with their scores, weakest first; ties by topological position.
pub fn detect_gaps_detailed(
    snapshot: &MasterySnapshot,
    graph: &CompetencyGraph,
    threshold: f64,
) -> Vec<Gap> {
    let is_weak = |id: &str| score_of(snapshot, id) < threshold;

    let mut gaps: Vec<(usize, Gap)> = graph
        .topological_order()
        .iter()
        .enumerate()
        .filter(|(_, competency)| is_weak(&competency.id))
        .filter(|(_, competency)| !competency.prerequisites.iter().any(|p| is_weak(p)))
        .map(|(pos, competency)| {
            (
                pos,
                Gap {
                    competency_id: competency.id.clone(),
                    score: score_of(snapshot, &competency.id),
                },
            )
        })
        .collect();

    gaps.sort_by(|(pos_a, a), (pos_b, b)| a.score.total_cmp(&b.score).then(pos_a.cmp(pos_b)));
    gaps.into_iter().map(|(_, gap)| gap).collect()
}

/// Frontier gap ids, weakest first.
pub fn detect_gaps(
    snapshot: &MasterySnapshot,
    graph: &CompetencyGraph,
    threshold: f64,
) -> Vec<CompetencyId> {
    detect_gaps_detailed(snapshot, graph, threshold)
        .into_iter()
        .map(|gap| gap.competency_id)
        .collect()
}
