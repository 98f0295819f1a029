use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::coaching::orchestrator::Coach;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub coach: Arc<Coach>,
    pub config: Config,
    /// One permit per coaching request allowed in flight (`QUEUE_MAX_SIZE`).
    pub permits: Arc<Semaphore>,
}

impl AppState {
    pub fn new(config: Config, coach: Coach) -> Self {
        Self {
            coach: Arc::new(coach),
            permits: Arc::new(Semaphore::new(config.queue_max_size.max(1))),
            config,
        }
    }
}
