use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::response::AppError;
use crate::routes::{require_student, SuccessResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/position", get(position))
}

async fn position(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let student_id = require_student(&headers)?;
    let position = state.engine().get_pathway_position(&student_id).await?;
    Ok(Json(SuccessResponse::of(position)))
}
