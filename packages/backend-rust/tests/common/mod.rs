#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use skillpath_algo::{CompetencyGraph, Difficulty, QuizPack, QuizQuestion};
use skillpath_backend::catalog::QuizCatalog;
use skillpath_backend::content::{ContentDocument, KeywordContentStore};
use skillpath_backend::engine::{EngineConfig, LearningEngine};
use skillpath_backend::seed::seed_competencies;
use skillpath_backend::store::{InMemoryMasteryStore, InMemoryProfileStore, MasteryStore, ProfileStore};

pub const ARRAYS_QUIZ: &str = "arrays-basics";

fn question(prompt: &str, correct: usize) -> QuizQuestion {
    QuizQuestion {
        prompt: prompt.to_string(),
        options: vec!["a".into(), "b".into(), "c".into()],
        correct_option_index: correct,
    }
}

/// Three questions with answer key [2, 0, 1].
pub fn arrays_quiz() -> QuizPack {
    QuizPack {
        id: ARRAYS_QUIZ.to_string(),
        title: "Array basics".to_string(),
        competency: "arrays".to_string(),
        level: Difficulty::Beginner,
        questions: vec![
            question("Index of the first element?", 2),
            question("Cost of random access?", 0),
            question("Cost of inserting at the front?", 1),
        ],
    }
}

pub fn trees_quiz() -> QuizPack {
    QuizPack {
        id: "trees-traversal".to_string(),
        title: "Tree traversal".to_string(),
        competency: "trees".to_string(),
        level: Difficulty::Intermediate,
        questions: vec![question("Which order visits root first?", 0), question("BFS uses?", 1)],
    }
}

pub fn content() -> KeywordContentStore {
    KeywordContentStore::new(vec![
        ContentDocument {
            source_id: "arrays-101".into(),
            text: "Arrays fundamentals with worked examples of traversal and indexing.".into(),
            competencies: vec!["arrays".into()],
        },
        ContentDocument {
            source_id: "arrays-video".into(),
            text: "Arrays explained with diagrams and videos.".into(),
            competencies: vec!["arrays".into()],
        },
        ContentDocument {
            source_id: "trees-101".into(),
            text: "Explain trees step by step: nodes, edges, traversal.".into(),
            competencies: vec!["trees".into()],
        },
    ])
}

pub fn test_engine_with_store(store: Arc<dyn MasteryStore>) -> LearningEngine {
    test_engine_with_stores(store, Arc::new(InMemoryProfileStore::new()))
}

pub fn test_engine_with_stores(
    store: Arc<dyn MasteryStore>,
    profiles: Arc<dyn ProfileStore>,
) -> LearningEngine {
    let graph = CompetencyGraph::build(seed_competencies()).unwrap();
    let mut quizzes = QuizCatalog::new();
    quizzes.insert(arrays_quiz(), &graph).unwrap();
    quizzes.insert(trees_quiz(), &graph).unwrap();
    LearningEngine::new(
        graph,
        quizzes,
        store,
        profiles,
        Arc::new(content()),
        EngineConfig::default(),
    )
}

pub fn test_engine() -> LearningEngine {
    test_engine_with_store(Arc::new(InMemoryMasteryStore::new()))
}

pub fn create_test_app() -> Router {
    skillpath_backend::build_router(test_engine())
}
