use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::routes::SuccessResponse;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthDto {
    status: &'static str,
    uptime_seconds: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InfoDto {
    name: &'static str,
    version: &'static str,
    uptime_seconds: u64,
    skills: usize,
    problems: usize,
    courses: usize,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/live", get(live))
        .route("/health/info", get(info))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthDto {
        status: "ok",
        uptime_seconds: state.uptime_seconds(),
    })
}

async fn live() -> impl IntoResponse {
    Json(HealthDto {
        status: "ok",
        uptime_seconds: 0,
    })
}

async fn info(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.content().current();
    Json(SuccessResponse::of(InfoDto {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime_seconds(),
        skills: snapshot.graph.len(),
        problems: snapshot.bank.len(),
        courses: snapshot.courses.len(),
    }))
}
