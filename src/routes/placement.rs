use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use crate::response::AppError;
use crate::routes::{require_student, SuccessResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartRequest {
    domain: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnswerRequest {
    problem_id: String,
    answer: String,
    response_time_seconds: f64,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/start", post(start))
        .route("/:sessionId/answer", post(answer))
        .route("/:sessionId/abandon", post(abandon))
}

async fn start(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<StartRequest>,
) -> Result<impl IntoResponse, AppError> {
    let student_id = require_student(&headers)?;
    let started = state
        .engine()
        .start_placement(&student_id, payload.domain.trim())
        .await?;
    Ok(Json(SuccessResponse::of(started)))
}

async fn answer(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(payload): Json<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let step = state
        .engine()
        .submit_placement_answer(
            session_id.trim(),
            payload.problem_id.trim(),
            &payload.answer,
            payload.response_time_seconds,
        )
        .await?;
    Ok(Json(SuccessResponse::of(step)))
}

async fn abandon(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.engine().abandon_placement(session_id.trim()).await?;
    Ok(Json(SuccessResponse::of(serde_json::json!({
        "abandoned": true
    }))))
}
