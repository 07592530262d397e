use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use super::run_engine;
use crate::response::{ok, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct ObjectivesQuery {
    /// Comma-separated competency ids
    targets: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_competencies))
        .route("/objectives", get(objectives))
        .route("/:competency_id", get(get_competency))
}

async fn list_competencies(State(state): State<AppState>) -> impl IntoResponse {
    let engine = state.engine();
    ok(engine.graph().topological_order().to_vec())
}

async fn get_competency(
    State(state): State<AppState>,
    Path(competency_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let engine = state.engine();
    let competency = engine
        .graph()
        .require(&competency_id)
        .map_err(|err| AppError::not_found(err.to_string()))?;
    Ok(ok(competency.clone()))
}

async fn objectives(
    State(state): State<AppState>,
    query: Result<Query<ObjectivesQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query?;
    let targets = split_ids(&query.targets);
    let objectives =
        run_engine(&state, move |engine| engine.objectives_for(targets.as_slice())).await?;
    Ok(ok(objectives))
}

fn split_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}
