//! Competency Prerequisite Graph
//!
//! Holds the read-only competency catalog and its prerequisite edges.
//!
//! - Cycle detection uses an explicit three-state mark per node and a heap
//!   allocated frame stack, so arbitrarily deep catalogs never touch the call stack.
//! - Topological order is Kahn's algorithm with the ready set kept ordered by id,
//!   which makes the order reproducible across runs and platforms.

use std::collections::{BTreeSet, HashMap};

use crate::error::{GraphError, NotFoundError};
use crate::types::Competency;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Validated, acyclic competency catalog stored in topological order
#[derive(Clone, Debug)]
pub struct CompetencyGraph {
    nodes: Vec<Competency>,
    position: HashMap<String, usize>,
}

impl CompetencyGraph {
    /// Build the graph, rejecting empty or duplicate ids, unknown prerequisites and cycles.
    pub fn build(competencies: Vec<Competency>) -> Result<Self, GraphError> {
        let mut sorted = competencies;
        sorted.sort_by(|a, b| a.id.cmp(&b.id));

        let mut index: HashMap<&str, usize> = HashMap::with_capacity(sorted.len());
        for (i, competency) in sorted.iter().enumerate() {
            if competency.id.trim().is_empty() {
                return Err(GraphError::EmptyId);
            }
            if index.insert(competency.id.as_str(), i).is_some() {
                return Err(GraphError::DuplicateId(competency.id.clone()));
            }
        }

        // edges[i] = prerequisites of node i, ascending by id
        let mut edges: Vec<Vec<usize>> = Vec::with_capacity(sorted.len());
        for competency in &sorted {
            let mut prereqs = Vec::with_capacity(competency.prerequisites.len());
            for prerequisite in &competency.prerequisites {
                let Some(&p) = index.get(prerequisite.as_str()) else {
                    return Err(GraphError::UnknownPrerequisite {
                        competency: competency.id.clone(),
                        prerequisite: prerequisite.clone(),
                    });
                };
                prereqs.push(p);
            }
            edges.push(prereqs);
        }

        detect_cycle(&sorted, &edges)?;
        let order = kahn_order(&edges);

        let mut slots: Vec<Option<Competency>> = sorted.into_iter().map(Some).collect();
        let nodes: Vec<Competency> = order
            .into_iter()
            .filter_map(|i| slots[i].take())
            .collect();
        let position = nodes
            .iter()
            .enumerate()
            .map(|(pos, c)| (c.id.clone(), pos))
            .collect();

        Ok(Self { nodes, position })
    }

    /// Every competency, each one after all of its prerequisites; ties by ascending id.
    pub fn topological_order(&self) -> &[Competency] {
        &self.nodes
    }

    pub fn get(&self, id: &str) -> Option<&Competency> {
        self.position.get(id).map(|&pos| &self.nodes[pos])
    }

    pub fn require(&self, id: &str) -> Result<&Competency, NotFoundError> {
        self.get(id).ok_or_else(|| NotFoundError::competency(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position.contains_key(id)
    }

    /// Index of `id` in the topological order
    pub fn position(&self, id: &str) -> Option<usize> {
        self.position.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Targets plus all of their transitive prerequisites, in topological order.
    pub fn closure_of<S: AsRef<str>>(
        &self,
        targets: &[S],
    ) -> Result<Vec<&Competency>, NotFoundError> {
        let mut included = vec![false; self.nodes.len()];
        let mut stack = Vec::with_capacity(targets.len());
        for target in targets {
            let target = target.as_ref();
            let pos = self
                .position(target)
                .ok_or_else(|| NotFoundError::competency(target))?;
            stack.push(pos);
        }

        while let Some(pos) = stack.pop() {
            if included[pos] {
                continue;
            }
            included[pos] = true;
            for prerequisite in &self.nodes[pos].prerequisites {
                if let Some(&p) = self.position.get(prerequisite) {
                    if !included[p] {
                        stack.push(p);
                    }
                }
            }
        }

        Ok(self
            .nodes
            .iter()
            .zip(included)
            .filter_map(|(competency, keep)| keep.then_some(competency))
            .collect())
    }
}

fn detect_cycle(nodes: &[Competency], edges: &[Vec<usize>]) -> Result<(), GraphError> {
    let mut marks = vec![Mark::Unvisited; nodes.len()];

    for root in 0..nodes.len() {
        if marks[root] != Mark::Unvisited {
            continue;
        }
        marks[root] = Mark::InProgress;
        // (node, index of the next edge to explore)
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];

        while let Some(&(node, next)) = stack.last() {
            let Some(&child) = edges[node].get(next) else {
                marks[node] = Mark::Done;
                stack.pop();
                continue;
            };
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }

            match marks[child] {
                Mark::Unvisited => {
                    marks[child] = Mark::InProgress;
                    stack.push((child, 0));
                }
                Mark::InProgress => {
                    let start = stack.iter().position(|&(n, _)| n == child).unwrap_or(0);
                    let mut path: Vec<String> = stack[start..]
                        .iter()
                        .map(|&(n, _)| nodes[n].id.clone())
                        .collect();
                    path.push(nodes[child].id.clone());
                    return Err(GraphError::Cycle { path });
                }
                Mark::Done => {}
            }
        }
    }

    Ok(())
}

/// Node indices in dependency order. Indices follow ascending id, so the ordered
/// ready set yields the smallest available id first.
fn kahn_order(edges: &[Vec<usize>]) -> Vec<usize> {
    let mut pending: Vec<usize> = edges.iter().map(Vec::len).collect();
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); edges.len()];
    for (node, prereqs) in edges.iter().enumerate() {
        for &p in prereqs {
            dependents[p].push(node);
        }
    }

    let mut ready: BTreeSet<usize> = pending
        .iter()
        .enumerate()
        .filter_map(|(i, &count)| (count == 0).then_some(i))
        .collect();
    let mut order = Vec::with_capacity(edges.len());

    while let Some(node) = ready.pop_first() {
        order.push(node);
        for &dependent in &dependents[node] {
            pending[dependent] -= 1;
            if pending[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }

    order
}
