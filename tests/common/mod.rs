#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tempfile::TempDir;

use mathpath_backend_rust::config::Config;
use mathpath_backend_rust::content::ContentStore;
use mathpath_backend_rust::engine::config::EngineConfig;
use mathpath_backend_rust::engine::engine::MasteryEngine;
use mathpath_backend_rust::seed;

/// Engine over the seeded demo content. The TempDir must outlive the
/// engine; callers keep it alive by holding the tuple.
pub fn demo_engine(config: EngineConfig) -> (Arc<MasteryEngine>, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    seed::ensure_content(dir.path()).expect("seed content");
    let store = Arc::new(
        ContentStore::open(dir.path().to_path_buf(), Duration::from_secs(3600))
            .expect("content store"),
    );
    (Arc::new(MasteryEngine::new(config, store)), dir)
}

/// Engine config that finalizes a placement screener on the first answer.
pub fn instant_screener_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.screener_budget_seconds = 0;
    config
}

pub fn create_test_app() -> (Router, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        log_level: "warn".to_string(),
        content_dir: dir.path().to_path_buf(),
        content_ttl: Duration::from_secs(3600),
    };
    let app = mathpath_backend_rust::create_app_with_config(&config).expect("create app");
    (app, dir)
}
