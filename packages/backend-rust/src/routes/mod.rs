mod competencies;
mod health;
mod quizzes;
mod users;

use axum::response::{IntoResponse, Response};
use axum::Router;

use crate::engine::{EngineError, LearningEngine};
use crate::response::AppError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/health", health::router())
        .nest("/api/competencies", competencies::router())
        .nest("/api/quizzes", quizzes::router())
        .nest("/api/users", users::router())
        .fallback(fallback_handler)
        .with_state(state)
}

/// Run an engine call off the async runtime; the file store does blocking I/O.
pub(crate) async fn run_engine<T, F>(state: &AppState, f: F) -> Result<T, AppError>
where
    F: FnOnce(&LearningEngine) -> Result<T, EngineError> + Send + 'static,
    T: Send + 'static,
{
    let engine = state.engine();
    tokio::task::spawn_blocking(move || f(&engine))
        .await
        .map_err(|err| AppError::internal(format!("engine task failed: {err}")))?
        .map_err(AppError::from)
}

async fn fallback_handler() -> Response {
    AppError::not_found("endpoint not found").into_response()
}
