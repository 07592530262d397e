use std::time::SystemTime;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::response::ok;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    timestamp: String,
    start_time: String,
    uptime: u64,
    competencies: usize,
    quizzes: usize,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(root))
}

async fn root(State(state): State<AppState>) -> impl IntoResponse {
    let engine = state.engine();
    ok(HealthResponse {
        status: "ok",
        service: "skillpath-backend",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        start_time: system_time_iso(state.started_at_system()),
        uptime: state.uptime_seconds(),
        competencies: engine.graph().len(),
        quizzes: engine.quizzes().len(),
    })
}

fn system_time_iso(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Millis, true)
}
