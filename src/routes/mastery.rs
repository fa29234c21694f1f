use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::response::AppError;
use crate::routes::{require_student, SuccessResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttemptRequest {
    problem_id: String,
    answer: String,
    response_time_seconds: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SkillRequest {
    skill_id: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/active-quest", get(active_quest))
        .route("/attempt", post(attempt))
        .route("/complete-quest", post(complete_quest))
        .route("/reset-skill", post(reset_skill))
}

async fn active_quest(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let student_id = require_student(&headers)?;
    let quest = state.engine().get_active_quest(&student_id).await?;
    Ok(Json(SuccessResponse::of(quest)))
}

async fn attempt(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<AttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    let student_id = require_student(&headers)?;
    let outcome = state
        .engine()
        .submit_practice_attempt(
            &student_id,
            payload.problem_id.trim(),
            &payload.answer,
            payload.response_time_seconds,
        )
        .await?;
    Ok(Json(SuccessResponse::of(outcome)))
}

async fn complete_quest(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SkillRequest>,
) -> Result<impl IntoResponse, AppError> {
    let student_id = require_student(&headers)?;
    let completion = state
        .engine()
        .complete_quest(&student_id, payload.skill_id.trim())
        .await?;
    Ok(Json(SuccessResponse::of(completion)))
}

async fn reset_skill(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SkillRequest>,
) -> Result<impl IntoResponse, AppError> {
    let student_id = require_student(&headers)?;
    state
        .engine()
        .reset_skill(&student_id, payload.skill_id.trim())
        .await?;
    Ok(Json(SuccessResponse::of(serde_json::json!({
        "reset": true
    }))))
}
