//! Error types shared by the algorithm modules.

use thiserror::Error;

/// Catalog problems detected while building the prerequisite graph
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("competency id must not be empty")]
    EmptyId,

    #[error("duplicate competency id: {0}")]
    DuplicateId(String),

    #[error("competency {competency} references unknown prerequisite {prerequisite}")]
    UnknownPrerequisite {
        competency: String,
        prerequisite: String,
    },

    #[error("prerequisite cycle detected: {}", path.join(" -> "))]
    Cycle { path: Vec<String> },
}

/// Malformed input rejected before any state changes
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("attempt was submitted for quiz {attempt}, not {pack}")]
    QuizMismatch { pack: String, attempt: String },

    #[error("expected {expected} selections, got {got}")]
    SelectionCountMismatch { expected: usize, got: usize },

    #[error("question {question}: selected option {index} is out of range (quiz offers {options})")]
    SelectionOutOfRange {
        question: usize,
        index: usize,
        options: usize,
    },

    #[error("question {question}: selected option {index} is negative")]
    NegativeSelection { question: usize, index: i64 },

    #[error("quiz {quiz} has no questions")]
    EmptyQuiz { quiz: String },

    #[error("quiz {quiz} question {question}: at least 2 options required, found {found}")]
    TooFewOptions {
        quiz: String,
        question: usize,
        found: usize,
    },

    #[error("quiz {quiz} question {question}: duplicate option {option:?}")]
    DuplicateOption {
        quiz: String,
        question: usize,
        option: String,
    },

    #[error("quiz {quiz} question {question}: correct option {index} is out of range ({options} options)")]
    AnswerOutOfRange {
        quiz: String,
        question: usize,
        index: usize,
        options: usize,
    },

    #[error("duplicate quiz id: {0}")]
    DuplicateQuiz(String),

    #[error("quiz {quiz} targets unknown competency {competency}")]
    UnknownCompetency { quiz: String, competency: String },

    #[error("signal must be a finite value in [0, 1], got {0}")]
    SignalOutOfRange(f64),

    #[error("unknown difficulty level: {0}")]
    UnknownDifficulty(String),

    #[error("unknown learning style: {0}")]
    UnknownLearningStyle(String),

    #[error("at least one target competency is required")]
    EmptyTargets,
}

/// Lookup of an id that is not in the loaded catalog
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} not found: {id}")]
pub struct NotFoundError {
    pub kind: &'static str,
    pub id: String,
}

impl NotFoundError {
    pub fn competency(id: impl Into<String>) -> Self {
        Self {
            kind: "competency",
            id: id.into(),
        }
    }

    pub fn quiz(id: impl Into<String>) -> Self {
        Self {
            kind: "quiz",
            id: id.into(),
        }
    }
}

/// Failure of a path request
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),
}
