use std::collections::BTreeMap;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use skillpath_algo::{Difficulty, MasteryRecord, QuizAttempt, ValidationError};

use super::run_engine;
use crate::engine::{LearningStyle, PathOptions, ProfileUpdate};
use crate::response::{ok, AppError};
use crate::state::AppState;
use crate::store::LearnerProfile;

const DEFAULT_INTERACTION_DIFFICULTY: f64 = 0.5;
const DEFAULT_HISTORY_LIMIT: usize = 50;
const MAX_HISTORY_LIMIT: usize = 500;

/// Anything left out is taken from the saved profile.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PathRequest {
    #[serde(default)]
    targets: Vec<String>,
    level: Option<String>,
    style: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GradeRequest {
    /// Optional echo of the quiz id; must match the path when present.
    quiz_id: Option<String>,
    // signed so a negative index is reported as a validation failure
    selected_indices: Vec<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileRequest {
    level: Option<String>,
    style: Option<String>,
    #[serde(default)]
    goals: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InteractionRequest {
    competency: String,
    score: f64,
    difficulty: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct GapsQuery {
    threshold: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PredictQuery {
    competency: String,
    difficulty: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MasteryDto {
    user_id: String,
    records: BTreeMap<String, MasteryRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileDto {
    user_id: String,
    #[serde(flatten)]
    profile: LearnerProfile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetDto {
    user_id: String,
    reset: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:user_id/path", post(generate_path))
        .route("/:user_id/quizzes/:quiz_id/grade", post(grade_quiz))
        .route("/:user_id/interactions", post(record_interaction))
        .route("/:user_id/gaps", get(get_gaps))
        .route("/:user_id/predict", get(predict))
        .route("/:user_id/mastery", get(get_mastery).delete(reset_mastery))
        .route("/:user_id/profile", get(get_profile).put(save_profile))
        .route("/:user_id/history", get(get_history))
}

async fn generate_path(
    State(state): State<AppState>,
    user_id: Result<Path<String>, PathRejection>,
    payload: Result<Json<PathRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(user_id) = user_id?;
    let Json(request) = payload?;

    let options = PathOptions {
        targets: request.targets,
        level: request.level.as_deref().map(parse_difficulty).transpose()?,
        style: request.style.as_deref().map(parse_style).transpose()?,
    };

    let plan = run_engine(&state, move |engine| engine.plan(&user_id, options)).await?;
    Ok(ok(plan))
}

async fn grade_quiz(
    State(state): State<AppState>,
    params: Result<Path<(String, String)>, PathRejection>,
    payload: Result<Json<GradeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path((user_id, quiz_id)) = params?;
    let Json(request) = payload?;

    if let Some(body_quiz_id) = request.quiz_id.filter(|id| *id != quiz_id) {
        return Err(AppError::validation(
            ValidationError::QuizMismatch {
                pack: quiz_id,
                attempt: body_quiz_id,
            }
            .to_string(),
        ));
    }
    let selected_indices = request
        .selected_indices
        .iter()
        .enumerate()
        .map(|(question, &index)| {
            usize::try_from(index).map_err(|_| {
                AppError::validation(
                    ValidationError::NegativeSelection { question, index }.to_string(),
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let attempt = QuizAttempt {
        quiz_id,
        selected_indices,
    };

    let outcome = run_engine(&state, move |engine| engine.grade(&user_id, &attempt)).await?;
    Ok(ok(outcome))
}

async fn record_interaction(
    State(state): State<AppState>,
    user_id: Result<Path<String>, PathRejection>,
    payload: Result<Json<InteractionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(user_id) = user_id?;
    let Json(request) = payload?;
    let difficulty = request.difficulty.unwrap_or(DEFAULT_INTERACTION_DIFFICULTY);

    let record = run_engine(&state, move |engine| {
        engine.record_interaction(&user_id, &request.competency, request.score, difficulty)
    })
    .await?;
    Ok(ok(record))
}

async fn get_gaps(
    State(state): State<AppState>,
    user_id: Result<Path<String>, PathRejection>,
    query: Result<Query<GapsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(user_id) = user_id?;
    let Query(query) = query?;
    let gaps = run_engine(&state, move |engine| {
        engine.detect_gaps(&user_id, query.threshold)
    })
    .await?;
    Ok(ok(gaps))
}

async fn predict(
    State(state): State<AppState>,
    user_id: Result<Path<String>, PathRejection>,
    query: Result<Query<PredictQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(user_id) = user_id?;
    let Query(query) = query?;
    let difficulty = query.difficulty.as_deref().map(parse_difficulty).transpose()?;

    let prediction = run_engine(&state, move |engine| {
        engine.predict(&user_id, &query.competency, difficulty)
    })
    .await?;
    Ok(ok(prediction))
}

async fn get_mastery(
    State(state): State<AppState>,
    user_id: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(user_id) = user_id?;
    let snapshot = {
        let user_id = user_id.clone();
        run_engine(&state, move |engine| engine.mastery_snapshot(&user_id)).await?
    };
    Ok(ok(MasteryDto {
        user_id,
        records: snapshot.into_iter().collect(),
    }))
}

async fn reset_mastery(
    State(state): State<AppState>,
    user_id: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(user_id) = user_id?;
    let reset = {
        let user_id = user_id.clone();
        run_engine(&state, move |engine| engine.reset_user(&user_id)).await?
    };
    Ok(ok(ResetDto { user_id, reset }))
}

async fn get_profile(
    State(state): State<AppState>,
    user_id: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(user_id) = user_id?;
    let profile = {
        let user_id = user_id.clone();
        run_engine(&state, move |engine| engine.profile(&user_id)).await?
    };
    Ok(ok(ProfileDto { user_id, profile }))
}

async fn save_profile(
    State(state): State<AppState>,
    user_id: Result<Path<String>, PathRejection>,
    payload: Result<Json<ProfileRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(user_id) = user_id?;
    let Json(request) = payload?;
    let update = ProfileUpdate {
        level: match request.level.as_deref() {
            Some(level) => parse_difficulty(level)?,
            None => Difficulty::default(),
        },
        style: request.style.as_deref().map(parse_style).transpose()?,
        goals: request.goals,
    };

    let profile = {
        let user_id = user_id.clone();
        run_engine(&state, move |engine| engine.save_profile(&user_id, update)).await?
    };
    Ok(ok(ProfileDto { user_id, profile }))
}

async fn get_history(
    State(state): State<AppState>,
    user_id: Result<Path<String>, PathRejection>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(user_id) = user_id?;
    let Query(query) = query?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .min(MAX_HISTORY_LIMIT);

    let history = run_engine(&state, move |engine| engine.history(&user_id, limit)).await?;
    Ok(ok(history))
}

fn parse_style(raw: &str) -> Result<LearningStyle, AppError> {
    raw.parse::<LearningStyle>()
        .map_err(|err| AppError::validation(err.to_string()))
}

fn parse_difficulty(raw: &str) -> Result<Difficulty, AppError> {
    raw.parse::<Difficulty>()
        .map_err(|err| AppError::validation(err.to_string()))
}
