use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use skillpath_algo::{Difficulty, QuizPack};

use crate::response::{ok, AppError};
use crate::state::AppState;

/// A quiz as shown to a learner: no answer key.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuizView {
    id: String,
    title: String,
    competency: String,
    level: Difficulty,
    questions: Vec<QuestionView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuestionView {
    prompt: String,
    options: Vec<String>,
}

impl From<&QuizPack> for QuizView {
    fn from(pack: &QuizPack) -> Self {
        Self {
            id: pack.id.clone(),
            title: pack.title.clone(),
            competency: pack.competency.clone(),
            level: pack.level,
            questions: pack
                .questions
                .iter()
                .map(|q| QuestionView {
                    prompt: q.prompt.clone(),
                    options: q.options.clone(),
                })
                .collect(),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_quizzes))
        .route("/:quiz_id", get(get_quiz))
}

async fn list_quizzes(State(state): State<AppState>) -> impl IntoResponse {
    ok(state.engine().quizzes().summaries())
}

async fn get_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let engine = state.engine();
    let pack = engine
        .quizzes()
        .require(&quiz_id)
        .map_err(|err| AppError::not_found(err.to_string()))?;
    Ok(ok(QuizView::from(pack)))
}
