#![allow(dead_code)]

pub mod config;
pub mod content;
pub mod engine;
pub mod logging;
pub mod response;
pub mod routes;
pub mod seed;
pub mod state;

use std::sync::Arc;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::content::ContentStore;
use crate::state::AppState;

/// Builds the full application router. Content load failures are fatal:
/// the engine never starts on a broken graph or bank.
pub fn create_app() -> Result<axum::Router, engine::EngineError> {
    let config = Config::from_env();
    create_app_with_config(&config)
}

pub fn create_app_with_config(config: &Config) -> Result<axum::Router, engine::EngineError> {
    seed::ensure_content(&config.content_dir)?;
    let content = Arc::new(ContentStore::open(
        config.content_dir.clone(),
        config.content_ttl,
    )?);
    let engine = AppState::create_engine(Arc::clone(&content));
    let state = AppState::new(content, engine);

    Ok(routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()))
}
