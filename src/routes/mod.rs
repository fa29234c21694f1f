mod content;
mod health;
mod mastery;
mod pathway;
mod placement;

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde::Serialize;

use crate::response::{json_error, AppError};
use crate::state::AppState;

pub const STUDENT_HEADER: &str = "x-student-id";

#[derive(Serialize)]
pub(crate) struct SuccessResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> SuccessResponse<T> {
    pub fn of(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Session identity is an external collaborator; the integrating layer
/// forwards the authenticated student id in a header.
pub(crate) fn require_student(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get(STUDENT_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            json_error(
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                format!("missing {STUDENT_HEADER} header"),
            )
        })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .nest("/api/placement", placement::router())
        .nest("/api/mastery", mastery::router())
        .nest("/api/pathway", pathway::router())
        .nest("/api/content", content::router())
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> Response {
    json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "route not found").into_response()
}
