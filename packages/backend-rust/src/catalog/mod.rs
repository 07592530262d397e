//! Load-boundary validation for the competency catalog and quiz packs.
//!
//! Files arrive as loosely-typed JSON. They are parsed into `Raw*` records and
//! converted into validated algo types here, so nothing malformed ever reaches
//! graph construction or grading.

mod quizzes;

use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;
use skillpath_algo::{Competency, CompetencyGraph, Difficulty, GraphError, ValidationError};

use crate::content::{ContentDocument, KeywordContentStore};
use crate::seed::seed_competencies;

pub use quizzes::{QuizCatalog, QuizSummary};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read {origin}: {source}")]
    Io {
        origin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("catalog entry {index}: {reason}")]
    InvalidEntry { index: usize, reason: String },

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("quiz file {origin}: {reason}")]
    MalformedQuiz { origin: String, reason: String },

    #[error("quiz file {origin}: {source}")]
    InvalidQuiz {
        origin: String,
        #[source]
        source: ValidationError,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCatalog {
    List(Vec<RawCompetency>),
    Wrapped { competencies: Vec<RawCompetency> },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCompetency {
    id: Option<String>,
    name: Option<String>,
    #[serde(default)]
    prerequisites: Vec<String>,
    #[serde(default)]
    objectives: Vec<String>,
    #[serde(default, alias = "base_difficulty", alias = "level")]
    base_difficulty: Option<String>,
}

impl RawCompetency {
    fn validate(self, index: usize) -> Result<Competency, CatalogError> {
        let invalid = |reason: String| CatalogError::InvalidEntry { index, reason };

        let id = self
            .id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| invalid("missing id".to_string()))?;

        let mut prerequisites = BTreeSet::new();
        for prerequisite in self.prerequisites {
            let prerequisite = prerequisite.trim().to_string();
            if prerequisite.is_empty() {
                return Err(invalid(format!("{id}: blank prerequisite id")));
            }
            if !prerequisites.insert(prerequisite.clone()) {
                return Err(invalid(format!("{id}: prerequisite {prerequisite} listed twice")));
            }
        }

        if self.objectives.iter().any(|o| o.trim().is_empty()) {
            return Err(invalid(format!("{id}: blank objective")));
        }

        let base_difficulty = match self.base_difficulty {
            Some(level) => level
                .parse::<Difficulty>()
                .map_err(|err| invalid(format!("{id}: {err}")))?,
            None => Difficulty::Beginner,
        };

        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| id.clone());

        Ok(Competency {
            id,
            name,
            prerequisites,
            objectives: self.objectives,
            base_difficulty,
        })
    }
}

/// Parse and validate a catalog document (a JSON array, or `{"competencies": [...]}`).
pub fn parse_competencies(json: &str, origin: &str) -> Result<Vec<Competency>, CatalogError> {
    let raw: RawCatalog = serde_json::from_str(json).map_err(|source| CatalogError::Json {
        origin: origin.to_string(),
        source,
    })?;
    let entries = match raw {
        RawCatalog::List(entries) => entries,
        RawCatalog::Wrapped { competencies } => competencies,
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| entry.validate(index))
        .collect()
}

pub fn load_competencies(path: &Path) -> Result<Vec<Competency>, CatalogError> {
    let origin = path.display().to_string();
    let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        origin: origin.clone(),
        source,
    })?;
    parse_competencies(&json, &origin)
}

/// Build the process-wide graph from `path`, or from the seed catalog when unset.
pub fn load_graph(path: Option<&Path>) -> Result<CompetencyGraph, CatalogError> {
    let competencies = match path {
        Some(path) => load_competencies(path)?,
        None => {
            tracing::info!("no catalog path configured, using built-in catalog");
            seed_competencies()
        }
    };
    let graph = CompetencyGraph::build(competencies)?;
    tracing::info!(competencies = graph.len(), "competency graph loaded");
    Ok(graph)
}

/// Local resource documents (a JSON array of `{sourceId, text, competencies}`).
pub fn load_content(path: &Path) -> Result<KeywordContentStore, CatalogError> {
    let origin = path.display().to_string();
    let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        origin: origin.clone(),
        source,
    })?;
    let documents: Vec<ContentDocument> =
        serde_json::from_str(&json).map_err(|source| CatalogError::Json { origin, source })?;
    tracing::info!(documents = documents.len(), "content documents loaded");
    Ok(KeywordContentStore::new(documents))
}
