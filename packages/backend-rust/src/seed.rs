//! Built-in data-structures catalog, used when no `CATALOG_PATH` is configured.

use skillpath_algo::{Competency, Difficulty};

struct SeedCompetency {
    id: &'static str,
    name: &'static str,
    level: Difficulty,
    prerequisites: &'static [&'static str],
    objectives: &'static [&'static str],
}

const SEED_COMPETENCIES: &[SeedCompetency] = &[
    SeedCompetency {
        id: "arrays",
        name: "Arrays",
        level: Difficulty::Beginner,
        prerequisites: &[],
        objectives: &[
            "Define arrays and their memory layout",
            "Perform traversal and element access",
            "Analyze time/space complexity for core operations",
        ],
    },
    SeedCompetency {
        id: "linked-lists",
        name: "Linked Lists",
        level: Difficulty::Beginner,
        prerequisites: &["arrays"],
        objectives: &[
            "Explain node structure and pointers",
            "Implement insertion/deletion at head/tail",
            "Compare linked lists vs arrays",
        ],
    },
    SeedCompetency {
        id: "stacks",
        name: "Stacks",
        level: Difficulty::Beginner,
        prerequisites: &["arrays"],
        objectives: &[
            "Explain LIFO behavior",
            "Use stacks for expression evaluation",
            "Implement stack using arrays or linked lists",
        ],
    },
    SeedCompetency {
        id: "queues",
        name: "Queues",
        level: Difficulty::Beginner,
        prerequisites: &["arrays"],
        objectives: &[
            "Explain FIFO behavior",
            "Implement queue and circular queue",
            "Apply queues in BFS",
        ],
    },
    SeedCompetency {
        id: "trees",
        name: "Trees",
        level: Difficulty::Intermediate,
        prerequisites: &["arrays", "linked-lists"],
        objectives: &[
            "Define tree terminology (root, leaf, depth)",
            "Traverse trees (pre/in/post/level)",
            "Explain BST properties",
        ],
    },
    SeedCompetency {
        id: "graphs",
        name: "Graphs",
        level: Difficulty::Intermediate,
        prerequisites: &["arrays", "trees"],
        objectives: &[
            "Define graphs (directed/undirected, weighted)",
            "Traverse with DFS/BFS",
            "Compute shortest paths (Dijkstra/Bellman-Ford)",
        ],
    },
    SeedCompetency {
        id: "dp",
        name: "Dynamic Programming",
        level: Difficulty::Advanced,
        prerequisites: &["arrays", "graphs"],
        objectives: &[
            "Explain overlapping subproblems and optimal substructure",
            "Formulate state and transitions",
            "Implement memoization and tabulation",
        ],
    },
];

pub fn seed_competencies() -> Vec<Competency> {
    SEED_COMPETENCIES
        .iter()
        .map(|seed| Competency {
            id: seed.id.to_string(),
            name: seed.name.to_string(),
            prerequisites: seed.prerequisites.iter().map(|p| p.to_string()).collect(),
            objectives: seed.objectives.iter().map(|o| o.to_string()).collect(),
            base_difficulty: seed.level,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillpath_algo::CompetencyGraph;

    #[test]
    fn test_seed_catalog_builds() {
        let graph = CompetencyGraph::build(seed_competencies()).unwrap();
        assert_eq!(graph.len(), 7);
        assert_eq!(graph.topological_order()[0].id, "arrays");
        assert_eq!(graph.topological_order()[6].id, "dp");
    }
}
