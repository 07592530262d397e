use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use skillpath_algo::{
    CompetencyGraph, Difficulty, NotFoundError, QuizPack, QuizQuestion, ValidationError,
};

use super::CatalogError;

/// Quiz packs keyed by id, every one validated against the competency graph.
#[derive(Debug, Default, Clone)]
pub struct QuizCatalog {
    packs: BTreeMap<String, QuizPack>,
}

/// Listing entry; omits the answer key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub id: String,
    pub title: String,
    pub competency: String,
    pub level: Difficulty,
    pub question_count: usize,
}

impl QuizCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `pack` after structural and graph checks.
    pub fn insert(&mut self, pack: QuizPack, graph: &CompetencyGraph) -> Result<(), ValidationError> {
        pack.validate_against(graph)?;
        if self.packs.contains_key(&pack.id) {
            return Err(ValidationError::DuplicateQuiz(pack.id));
        }
        self.packs.insert(pack.id.clone(), pack);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&QuizPack> {
        self.packs.get(id)
    }

    pub fn require(&self, id: &str) -> Result<&QuizPack, NotFoundError> {
        self.get(id).ok_or_else(|| NotFoundError::quiz(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &QuizPack> {
        self.packs.values()
    }

    pub fn len(&self) -> usize {
        self.packs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }

    pub fn for_competency<'a>(&'a self, competency: &'a str) -> impl Iterator<Item = &'a QuizPack> {
        self.iter().filter(move |pack| pack.competency == competency)
    }

    pub fn summaries(&self) -> Vec<QuizSummary> {
        self.iter()
            .map(|pack| QuizSummary {
                id: pack.id.clone(),
                title: pack.title.clone(),
                competency: pack.competency.clone(),
                level: pack.level,
                question_count: pack.questions.len(),
            })
            .collect()
    }

    /// Load every `*.json` file in `dir`, in file-name order.
    ///
    /// A missing directory yields an empty catalog. Any malformed or invalid file
    /// aborts the whole load.
    pub fn load_dir(dir: &Path, graph: &CompetencyGraph) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        if !dir.is_dir() {
            tracing::warn!(dir = %dir.display(), "quiz directory not found, no quizzes loaded");
            return Ok(catalog);
        }

        let io_err = |source| CatalogError::Io {
            origin: dir.display().to_string(),
            source,
        };
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            let is_json = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
            if is_json && path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        for path in files {
            let origin = path.display().to_string();
            let json = std::fs::read_to_string(&path).map_err(|source| CatalogError::Io {
                origin: origin.clone(),
                source,
            })?;
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            let pack = parse_quiz_pack(&json, &stem, &origin)?;
            catalog
                .insert(pack, graph)
                .map_err(|source| CatalogError::InvalidQuiz { origin, source })?;
        }

        tracing::info!(quizzes = catalog.len(), dir = %dir.display(), "quiz catalog loaded");
        Ok(catalog)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuizPack {
    id: Option<String>,
    title: Option<String>,
    competency: Option<String>,
    #[serde(default)]
    level: Option<String>,
    #[serde(default)]
    questions: Vec<RawQuestion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
    #[serde(alias = "question")]
    prompt: Option<String>,
    #[serde(default)]
    options: Vec<String>,
    #[serde(alias = "answer_index", alias = "correct_option_index", alias = "answerIndex")]
    correct_option_index: Option<i64>,
}

/// Parse one quiz document. `fallback_id` (the file stem) is used when the
/// document carries no id of its own.
pub(crate) fn parse_quiz_pack(
    json: &str,
    fallback_id: &str,
    origin: &str,
) -> Result<QuizPack, CatalogError> {
    let raw: RawQuizPack = serde_json::from_str(json).map_err(|source| CatalogError::Json {
        origin: origin.to_string(),
        source,
    })?;
    let malformed = |reason: String| CatalogError::MalformedQuiz {
        origin: origin.to_string(),
        reason,
    };

    let id = non_blank(raw.id)
        .or_else(|| non_blank(Some(fallback_id.to_string())))
        .ok_or_else(|| malformed("missing quiz id".to_string()))?;
    let competency =
        non_blank(raw.competency).ok_or_else(|| malformed("missing competency".to_string()))?;
    let level = match raw.level {
        Some(level) => level
            .parse::<Difficulty>()
            .map_err(|err| malformed(err.to_string()))?,
        None => Difficulty::Beginner,
    };

    let mut questions = Vec::with_capacity(raw.questions.len());
    for (i, question) in raw.questions.into_iter().enumerate() {
        let prompt = non_blank(question.prompt)
            .ok_or_else(|| malformed(format!("question {i}: missing prompt")))?;
        let answer = question
            .correct_option_index
            .ok_or_else(|| malformed(format!("question {i}: missing answer index")))?;
        let correct_option_index = usize::try_from(answer)
            .map_err(|_| malformed(format!("question {i}: negative answer index {answer}")))?;
        questions.push(QuizQuestion {
            prompt,
            options: question.options,
            correct_option_index,
        });
    }

    Ok(QuizPack {
        title: non_blank(raw.title).unwrap_or_else(|| id.clone()),
        id,
        competency,
        level,
        questions,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
