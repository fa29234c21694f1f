use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::content::ContentStore;
use crate::engine::config::EngineConfig;
use crate::engine::engine::MasteryEngine;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    content: Arc<ContentStore>,
    engine: Arc<MasteryEngine>,
}

impl AppState {
    pub fn new(content: Arc<ContentStore>, engine: Arc<MasteryEngine>) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            content,
            engine,
        }
    }

    pub fn create_engine(content: Arc<ContentStore>) -> Arc<MasteryEngine> {
        Arc::new(MasteryEngine::new(EngineConfig::from_env(), content))
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn content(&self) -> Arc<ContentStore> {
        Arc::clone(&self.content)
    }

    pub fn engine(&self) -> Arc<MasteryEngine> {
        Arc::clone(&self.engine)
    }
}
