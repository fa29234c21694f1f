use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::content::ContentVersion;
use crate::response::AppError;
use crate::routes::SuccessResponse;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentStatusDto {
    version: ContentVersion,
    loaded_at: i64,
    skills: usize,
    problems: usize,
    courses: usize,
    content_gaps: Vec<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(status))
        .route("/refresh", post(refresh))
}

async fn status(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let snapshot = state.content().current();
    Ok(Json(SuccessResponse::of(ContentStatusDto {
        version: snapshot.version,
        loaded_at: snapshot.loaded_at_ms,
        skills: snapshot.graph.len(),
        problems: snapshot.bank.len(),
        courses: snapshot.courses.len(),
        content_gaps: snapshot.bank.content_gaps().to_vec(),
    })))
}

async fn refresh(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let snapshot = state.content().refresh()?;
    Ok(Json(SuccessResponse::of(ContentStatusDto {
        version: snapshot.version,
        loaded_at: snapshot.loaded_at_ms,
        skills: snapshot.graph.len(),
        problems: snapshot.bank.len(),
        courses: snapshot.courses.len(),
        content_gaps: snapshot.bank.content_gaps().to_vec(),
    })))
}
